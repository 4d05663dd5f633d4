//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Backend call:
//!     → retries.rs (admission check, attempt loop, health feedback)
//!     → timeouts.rs (per-attempt deadline)
//!     → On a health-signal failure: backoff.rs (linear delay) → next attempt
//! ```
//!
//! # Design Decisions
//! - Every backend call has a deadline
//! - Failure state lives in the shared `HealthMonitor`, not here
//! - Composable: wraps any future returning `Result<T, RequestError>`

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{make_request, RequestOptions};
