//! Global loading indicator hooks.
//!
//! # Responsibilities
//! - Hold the optional show/hide callbacks supplied by the UI layer
//! - Guarantee exactly one hide per show, on every exit path
//!
//! # Design Decisions
//! - Hook errors are logged and swallowed; they never affect the request
//! - Hide runs from `Drop`, so cancelled or timed-out requests still hide

use std::error::Error;
use std::fmt;
use std::sync::Arc;

pub type HookError = Box<dyn Error + Send + Sync>;

type Hook = Arc<dyn Fn() -> Result<(), HookError> + Send + Sync>;

/// Optional show/hide callbacks. Absent hooks are no-ops.
#[derive(Clone, Default)]
pub struct LoadingHooks {
    show: Option<Hook>,
    hide: Option<Hook>,
}

impl fmt::Debug for LoadingHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingHooks")
            .field("show", &self.show.is_some())
            .field("hide", &self.hide.is_some())
            .finish()
    }
}

impl LoadingHooks {
    pub fn new<S, H>(show: S, hide: H) -> Self
    where
        S: Fn() -> Result<(), HookError> + Send + Sync + 'static,
        H: Fn() -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            show: Some(Arc::new(show)),
            hide: Some(Arc::new(hide)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_show<S>(mut self, show: S) -> Self
    where
        S: Fn() -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.show = Some(Arc::new(show));
        self
    }

    pub fn with_hide<H>(mut self, hide: H) -> Self
    where
        H: Fn() -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hide = Some(Arc::new(hide));
        self
    }

    /// Show the indicator; it is hidden when the returned guard drops.
    pub fn begin(&self) -> LoadingGuard {
        run_hook(self.show.as_ref(), "show");
        LoadingGuard {
            hide: self.hide.clone(),
        }
    }
}

/// RAII guard that hides the loading indicator on drop.
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct LoadingGuard {
    hide: Option<Hook>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        run_hook(self.hide.take().as_ref(), "hide");
    }
}

fn run_hook(hook: Option<&Hook>, name: &'static str) {
    if let Some(hook) = hook {
        if let Err(e) = hook() {
            tracing::warn!(hook = name, error = %e, "Loading indicator hook failed");
        }
    }
}
