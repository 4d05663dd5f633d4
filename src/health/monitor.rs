//! The backend health monitor.
//!
//! # Responsibilities
//! - Own the single circuit state for the backend
//! - Answer admission checks for outbound requests
//! - Broadcast health transitions to subscribers

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use url::Url;

use crate::client::request::endpoint_url;
use crate::clock::Clock;
use crate::config::HealthCheckConfig;
use crate::health::events::{HealthChange, HealthSubscription};
use crate::health::state::{Admission, CircuitState, HealthStatus, Transition};
use crate::observability::metrics;

const EVENT_CAPACITY: usize = 16;

/// Circuit and probe parameters.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Consecutive failures that open the circuit.
    pub threshold: u32,
    /// Cooldown before a half-open retry.
    pub reset_timeout: Duration,
    /// Active probe cadence.
    pub poll_interval: Duration,
    /// Deadline for a single probe.
    pub probe_timeout: Duration,
    /// Liveness endpoint.
    pub probe_url: Url,
}

impl MonitorSettings {
    /// Derive settings from config, appending the probe path to `base_url`.
    pub fn from_config(
        config: &HealthCheckConfig,
        base_url: &Url,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            threshold: config.failure_threshold,
            reset_timeout: config.reset_timeout(),
            poll_interval: config.interval(),
            probe_timeout: config.timeout(),
            probe_url: endpoint_url(base_url, &config.path)?,
        })
    }
}

pub(crate) struct Inner {
    pub(crate) settings: MonitorSettings,
    pub(crate) client: reqwest::Client,
    state: Mutex<CircuitState>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<HealthChange>,
    pub(crate) poller: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let poller = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = poller.take() {
            handle.abort();
        }
    }
}

/// Circuit breaker for the backend, shared by cloning.
///
/// Clones share one circuit. Construct one per backend at bootstrap and pass
/// it to everything that issues requests.
#[derive(Clone)]
pub struct HealthMonitor {
    pub(crate) inner: Arc<Inner>,
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("probe_url", &self.inner.settings.probe_url.as_str())
            .field("status", &self.status())
            .finish()
    }
}

impl HealthMonitor {
    pub fn new(settings: MonitorSettings, client: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        metrics::record_backend_health(true);

        Self {
            inner: Arc::new(Inner {
                settings,
                client,
                state: Mutex::new(CircuitState::new()),
                clock,
                events,
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.inner.settings
    }

    fn lock_state(&self) -> MutexGuard<'_, CircuitState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admission check run before every gated request.
    ///
    /// Once the cooldown has passed, an open circuit is reset here so the
    /// request itself probes the backend.
    pub fn can_make_request(&self) -> bool {
        let now = self.inner.clock.now_millis();
        let mut state = self.lock_state();

        match state.admit(now, self.inner.settings.reset_timeout) {
            Admission::Allowed => true,
            Admission::HalfOpen => {
                tracing::info!("Attempting to reset circuit breaker");
                self.notify(Transition::Closed, now);
                true
            }
            Admission::Denied => false,
        }
    }

    pub fn mark_healthy(&self) {
        let now = self.inner.clock.now_millis();
        let mut state = self.lock_state();

        if let Some(transition) = state.record_success() {
            tracing::info!("Backend is back online");
            self.notify(transition, now);
        }
    }

    pub fn mark_unhealthy(&self) {
        let now = self.inner.clock.now_millis();
        let mut state = self.lock_state();

        match state.record_failure(now, self.inner.settings.threshold) {
            Some(transition) => {
                tracing::warn!(
                    failure_count = state.failure_count(),
                    "Circuit breaker opened - backend appears to be down"
                );
                self.notify(transition, now);
            }
            None => {
                tracing::debug!(failure_count = state.failure_count(), "Backend failure recorded");
            }
        }
    }

    pub fn status(&self) -> HealthStatus {
        let now = self.inner.clock.now_millis();
        self.lock_state().snapshot(now, self.inner.settings.reset_timeout)
    }

    pub fn is_healthy(&self) -> bool {
        self.lock_state().is_healthy()
    }

    /// Register a listener for health transitions.
    pub fn subscribe(&self) -> HealthSubscription {
        HealthSubscription::new(self.inner.events.subscribe())
    }

    pub fn listener_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    // Called with the state lock held so listeners see transitions in order.
    fn notify(&self, transition: Transition, now: u64) {
        let healthy = transition.is_healthy();
        metrics::record_backend_health(healthy);
        metrics::record_circuit_transition(healthy);

        // No listeners is fine.
        let _ = self.inner.events.send(HealthChange {
            is_healthy: healthy,
            timestamp: now,
        });
    }
}
