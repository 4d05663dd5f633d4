//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe the backend liveness endpoint
//! - Feed probe results into the circuit state

use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;
use reqwest::header::USER_AGENT;
use tokio::time::{self, MissedTickBehavior};
use url::Url;

use crate::health::monitor::{HealthMonitor, Inner};
use crate::observability::metrics;

impl HealthMonitor {
    /// Start the periodic probe. The first probe fires immediately.
    ///
    /// Calling this while already monitoring replaces the running timer.
    /// Must be called from within a Tokio runtime.
    pub fn start_monitoring(&self) {
        let mut poller = self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = poller.take() {
            existing.abort();
            tracing::debug!("Replacing existing health check timer");
        }

        tracing::info!(
            interval_secs = self.inner.settings.poll_interval.as_secs(),
            url = %self.inner.settings.probe_url,
            "Health monitor starting"
        );

        let weak = Arc::downgrade(&self.inner);
        *poller = Some(tokio::spawn(poll_loop(weak, self.inner.settings.poll_interval)));
    }

    /// Stop the periodic probe. No-op when not monitoring.
    pub fn stop_monitoring(&self) {
        let mut poller = self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = poller.take() {
            handle.abort();
            tracing::info!("Health monitor stopped");
        }
    }

    pub fn is_monitoring(&self) -> bool {
        let poller = self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner);
        poller.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Probe the backend now, independent of the timer.
    pub async fn force_health_check(&self) -> bool {
        self.check_backend_health().await
    }

    async fn check_backend_health(&self) -> bool {
        let settings = &self.inner.settings;
        let healthy = probe(&self.inner.client, &settings.probe_url, settings.probe_timeout).await;
        metrics::record_probe(healthy);

        if healthy {
            self.mark_healthy();
        } else {
            self.mark_unhealthy();
        }
        healthy
    }
}

async fn poll_loop(inner: Weak<Inner>, interval: Duration) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(inner) = inner.upgrade() else {
            tracing::debug!("Health monitor dropped, exiting probe loop");
            break;
        };
        HealthMonitor { inner }.check_backend_health().await;
    }
}

/// One liveness request. Any 2xx within `timeout` counts as alive.
async fn probe(client: &reqwest::Client, url: &Url, timeout: Duration) -> bool {
    let request = client
        .get(url.clone())
        .header(USER_AGENT, "backend-gate-health-check")
        .send();

    match time::timeout(timeout, request).await {
        Ok(Ok(response)) => {
            let success = response.status().is_success();
            if !success {
                tracing::warn!(
                    url = %url,
                    status = %response.status(),
                    "Health check failed: non-success status"
                );
            }
            success
        }
        Ok(Err(e)) => {
            tracing::warn!(url = %url, error = %e, "Health check failed: connection error");
            false
        }
        Err(_) => {
            tracing::warn!(url = %url, "Health check failed: timeout");
            false
        }
    }
}
