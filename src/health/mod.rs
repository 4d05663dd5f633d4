//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer (first tick immediate)
//!     → GET <base-url>/up
//!     → Update state.rs
//!
//! Passive health checks (passive.rs):
//!     Request outcome observed by the client pipeline
//!     → Record success/failure
//!     → On failure, probe immediately in the background
//!
//! State machine (state.rs):
//!     Healthy ←→ Unhealthy, half-open reset after cooldown
//!
//! Transitions (events.rs):
//!     → broadcast HealthChange to every subscriber
//! ```
//!
//! # Design Decisions
//! - Active and passive checks are complementary
//! - One circuit per backend, owned by HealthMonitor
//! - Any real request can trigger the half-open reset; no need to wait for the timer

pub mod active;
pub mod events;
pub mod monitor;
pub mod passive;
pub mod state;

pub use events::{HealthChange, HealthSubscription, HEALTH_CHANGE_EVENT};
pub use monitor::{HealthMonitor, MonitorSettings};
pub use passive::HealthSignal;
pub use state::HealthStatus;
