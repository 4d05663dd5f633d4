//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Validate → storage → clock → credential purge
//!         → health monitor → routes/history → API client → session store
//!
//! Shutdown (shutdown.rs):
//!     Signal received → trigger broadcast → tasks exit → stop monitoring
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - One bootstrap builds every component and passes dependencies explicitly
//! - Fail fast: any startup error is fatal
//! - Monitoring starts only when asked, after bootstrap succeeded

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_shutdown_signal;
pub use startup::{ClientContext, StartupError};
