//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation request (location)
//!     → history.rs
//!     → guard.rs (route class + credential validity)
//!     → table.rs (location → route, route name → path)
//!     → Proceed, or Redirect and re-check the new target
//!
//! Forced redirect (401 from the request pipeline):
//!     Navigator::replace("/login") → history.rs
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Guard consults the credential guard on every navigation
//! - Redirect chains are bounded

pub mod guard;
pub mod history;
pub mod table;

use thiserror::Error;

pub use guard::{Decision, NavigationGuard};
pub use history::{Arrival, History};
pub use table::{Route, RouteTable};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route named '{0}'")]
    UnknownRoute(String),

    #[error("navigation to '{path}' exceeded {hops} redirects")]
    RedirectLoop { path: String, hops: usize },
}

/// Something that can move the user to another location.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// Replace the current location.
    fn replace(&self, path: &str);
}
