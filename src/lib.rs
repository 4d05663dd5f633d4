//! Backend Gate Client Library
//!
//! Health-aware request gating for a single-page client talking to one
//! backend: a circuit breaker fed by active probes and passive request
//! outcomes, a two-channel request pipeline, JWT expiry policing and a
//! route guard.

pub mod client;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod store;

pub use client::{ApiClient, ApiRequest, RequestError};
pub use config::schema::ClientConfig;
pub use health::{HealthChange, HealthMonitor};
pub use lifecycle::{ClientContext, Shutdown};
