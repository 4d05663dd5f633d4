//! Retry wrapper around arbitrary backend calls.
//!
//! # Responsibilities
//! - Gate the call on the circuit breaker
//! - Run each attempt under its own deadline, with the loading indicator shown
//! - Feed every outcome back into the health monitor
//!
//! # Design Decisions
//! - Only failures that say the backend is down are retried; a 401 or other
//!   4xx goes straight back to the caller
//! - Linear backoff, no jitter: one client, one backend

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::client::{LoadingHooks, RequestError};
use crate::config::RetryConfig;
use crate::health::HealthMonitor;
use crate::observability::metrics;
use crate::resilience::backoff::retry_delay;
use crate::resilience::timeouts::with_deadline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub attempt_timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    pub show_loading: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RequestOptions {
    fn from(config: &RetryConfig) -> Self {
        Self {
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            show_loading: config.show_loading,
        }
    }
}

/// Run `call` with admission control, per-attempt deadlines and retries.
pub async fn make_request<T, F, Fut>(
    monitor: &HealthMonitor,
    hooks: &LoadingHooks,
    options: &RequestOptions,
    mut call: F,
) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    if !monitor.can_make_request() {
        metrics::record_admission_denied("retry");
        return Err(RequestError::ServiceUnavailable);
    }

    let mut attempt = 0;
    loop {
        let result = {
            let _loading = options.show_loading.then(|| hooks.begin());
            with_deadline(options.attempt_timeout, call()).await
        };

        match result {
            Ok(value) => {
                monitor.mark_healthy();
                return Ok(value);
            }
            Err(e) if !e.is_health_signal() => return Err(e),
            Err(e) => {
                monitor.mark_unhealthy();
                if attempt >= options.retries {
                    tracing::warn!(
                        attempts = attempt + 1,
                        error = %e,
                        "Request failed after retries"
                    );
                    return Err(e);
                }

                let delay = retry_delay(attempt, options.retry_delay);
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying request"
                );
                metrics::record_retry();
                time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
