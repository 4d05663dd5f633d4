//! Navigation history.
//!
//! Applies the guard to every location change, follows redirects, and serves
//! forced redirects issued by the request pipeline.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::routing::guard::{Decision, NavigationGuard};
use crate::routing::{NavigationError, Navigator};

/// Redirects followed before giving up on a navigation.
const MAX_REDIRECTS: usize = 5;

/// Arrivals kept in the visited log; older entries fall off the front.
pub const MAX_VISITED: usize = 64;

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub path: String,
    /// The requested location, when a guard redirected away from it.
    pub redirected_from: Option<String>,
}

#[derive(Debug)]
pub struct History {
    guard: NavigationGuard,
    current: Mutex<Option<String>>,
    visited: Mutex<VecDeque<String>>,
}

impl History {
    pub fn new(guard: NavigationGuard) -> Self {
        Self {
            guard,
            current: Mutex::new(None),
            visited: Mutex::new(VecDeque::with_capacity(MAX_VISITED)),
        }
    }

    pub fn navigate(&self, location: &str) -> Result<Arrival, NavigationError> {
        let mut target = location.to_string();

        for _ in 0..=MAX_REDIRECTS {
            match self.guard.check(&target) {
                Decision::Proceed => {
                    tracing::debug!(path = %target, "Navigated");
                    *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(target.clone());
                    self.record_visit(&target);

                    let redirected_from = (target != location).then(|| location.to_string());
                    return Ok(Arrival {
                        path: target,
                        redirected_from,
                    });
                }
                Decision::Redirect(route) => {
                    tracing::debug!(
                        from = %target,
                        to = %route.path,
                        route = %route.name,
                        "Navigation redirected"
                    );
                    target = route.path;
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: location.to_string(),
            hops: MAX_REDIRECTS,
        })
    }

    pub fn current(&self) -> Option<String> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The most recent arrivals, oldest first, at most [`MAX_VISITED`].
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).iter().cloned().collect()
    }

    fn record_visit(&self, path: &str) {
        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if visited.len() == MAX_VISITED {
            visited.pop_front();
        }
        visited.push_back(path.to_string());
    }
}

impl Navigator for History {
    fn replace(&self, path: &str) {
        match self.navigate(path) {
            Ok(arrival) => tracing::info!(path = %arrival.path, "Forced navigation"),
            Err(e) => tracing::warn!(path, error = %e, "Forced navigation failed"),
        }
    }
}
