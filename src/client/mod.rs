//! Backend request pipeline.
//!
//! # Data Flow
//! ```text
//! caller
//!     → ApiClient::secured() / ApiClient::plain()
//!     → channel.rs (admission → credential → loading → dispatch → classify)
//!     → HealthMonitor (passive signals)
//!     → Navigator (forced sign-in redirect on 401)
//! ```
//!
//! # Design Decisions
//! - Two channels share one HTTP client and one circuit
//! - Only the authenticated channel is gated by the circuit breaker
//! - Failures always reach the caller; hooks and purges are best-effort

pub mod channel;
pub mod error;
pub mod loading;
pub mod request;

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::TimeoutConfig;
use crate::credentials::CredentialSlot;
use crate::health::HealthMonitor;
use crate::routing::Navigator;

pub use channel::{Channel, ChannelKind, REQUEST_ID_HEADER};
pub use error::{FailureClass, RequestError};
pub use loading::{HookError, LoadingGuard, LoadingHooks};
pub use request::ApiRequest;

use channel::AuthPolicy;

/// Collaborators the pipeline is built from.
#[derive(Debug, Clone)]
pub struct ClientDeps {
    pub http: reqwest::Client,
    pub monitor: HealthMonitor,
    pub credentials: CredentialSlot,
    pub navigator: Arc<dyn Navigator>,
    /// Where a 401 sends the user.
    pub sign_in_path: String,
    pub hooks: LoadingHooks,
}

/// The two request channels against one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    secured: Channel,
    plain: Channel,
}

impl ApiClient {
    pub fn new(base_url: Url, timeouts: &TimeoutConfig, deps: ClientDeps) -> Self {
        let secured = Channel::authenticated(
            deps.http.clone(),
            base_url.clone(),
            deps.monitor.clone(),
            deps.hooks.clone(),
            Duration::from_secs(timeouts.authenticated_request_secs),
            AuthPolicy {
                credentials: deps.credentials,
                navigator: deps.navigator,
                sign_in_path: deps.sign_in_path,
            },
        );
        let plain = Channel::plain(
            deps.http,
            base_url,
            deps.monitor,
            deps.hooks,
            Duration::from_secs(timeouts.plain_request_secs),
        );

        Self { secured, plain }
    }

    /// Gated, credential-carrying channel.
    pub fn secured(&self) -> &Channel {
        &self.secured
    }

    /// Ungated channel without credentials (sign-in, public endpoints).
    pub fn plain(&self) -> &Channel {
        &self.plain
    }
}
