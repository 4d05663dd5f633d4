//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the backend client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend location.
    pub backend: BackendConfig,

    /// Circuit breaker and liveness probe settings.
    pub health_check: HealthCheckConfig,

    /// Per-channel request deadlines.
    pub timeouts: TimeoutConfig,

    /// Generic retry wrapper settings.
    pub retries: RetryConfig,

    /// Credential storage and expiry checks.
    pub credentials: CredentialConfig,

    /// Route table and guard targets.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL every request path is joined onto (e.g., "http://localhost:3000").
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Health check and circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the periodic liveness probe.
    pub enabled: bool,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path to probe.
    pub path: String,

    /// Number of consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Cooldown in seconds before a half-open retry is allowed.
    pub reset_timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
            path: "/up".to_string(),
            failure_threshold: 2,
            reset_timeout_secs: 120,
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }
}

/// Default request deadlines per channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for authenticated requests in seconds.
    pub authenticated_request_secs: u64,

    /// Deadline for plain (unauthenticated) requests in seconds.
    pub plain_request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            // Slow downstream calls (model inference) sit behind some endpoints.
            authenticated_request_secs: 60,
            plain_request_secs: 60,
        }
    }
}

/// Retry wrapper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub retries: u32,

    /// Base delay in milliseconds; attempt `n` waits `n * retry_delay_ms`.
    pub retry_delay_ms: u64,

    /// Deadline for each attempt in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Toggle the loading indicator around each attempt.
    pub show_loading: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 1,
            retry_delay_ms: 1000,
            attempt_timeout_ms: 10_000,
            show_loading: true,
        }
    }
}

/// Credential storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// JSON file backing the key-value store. In-memory when unset.
    pub storage_path: Option<String>,

    /// Tokens expiring within this many seconds are treated as invalid on navigation.
    pub expiry_buffer_secs: u64,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            expiry_buffer_secs: 300,
        }
    }
}

/// A single application route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route name used for redirects.
    pub name: String,

    /// Absolute path (e.g., "/dashboard").
    pub path: String,

    /// Whether entering the route needs a valid credential.
    #[serde(default)]
    pub requires_auth: bool,
}

impl RouteConfig {
    pub fn new(name: &str, path: &str, requires_auth: bool) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            requires_auth,
        }
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Name of the sign-in route.
    pub sign_in_route: String,

    /// Name of the route signed-in users land on.
    pub landing_route: String,

    /// Route definitions.
    pub routes: Vec<RouteConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            sign_in_route: "Signin".to_string(),
            landing_route: "Dashboard".to_string(),
            routes: vec![
                RouteConfig::new("Home", "/", true),
                RouteConfig::new("Dashboard", "/dashboard", true),
                RouteConfig::new("ChecklistAnalyzer", "/checklist", true),
                RouteConfig::new("Signin", "/login", false),
            ],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
