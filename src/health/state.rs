//! Backend circuit state machine.
//!
//! # States
//! - Healthy (closed): requests are admitted
//! - Unhealthy (open): requests fail fast until the cooldown elapses
//! - Half-open: the first admission check after the cooldown flips the
//!   circuit back to healthy and lets real traffic test the backend
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= threshold
//! Unhealthy → Healthy: success observed, or admission after reset timeout
//! ```
//!
//! # Design Decisions
//! - Pure data: callers supply "now" so transitions are deterministic
//! - Each mutator reports whether the healthy flag actually changed
//! - The failure counter resets only when the circuit becomes healthy

use serde::Serialize;
use std::time::Duration;

/// A change of the healthy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Healthy → Unhealthy.
    Opened,
    /// Unhealthy → Healthy.
    Closed,
}

impl Transition {
    pub fn is_healthy(self) -> bool {
        matches!(self, Transition::Closed)
    }
}

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Circuit was open, the cooldown elapsed, and it has just been reset.
    HalfOpen,
    Denied,
}

/// Read-only snapshot for diagnostics and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub healthy: bool,
    pub failure_count: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "lastFailureTime")]
    pub last_failure_at: Option<u64>,
    pub would_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitState {
    healthy: bool,
    failure_count: u32,
    last_failure_at: Option<u64>,
}

impl Default for CircuitState {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitState {
    /// Circuits start healthy.
    pub fn new() -> Self {
        Self {
            healthy: true,
            failure_count: 0,
            last_failure_at: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn last_failure_at(&self) -> Option<u64> {
        self.last_failure_at
    }

    pub fn record_success(&mut self) -> Option<Transition> {
        let was_healthy = self.healthy;
        self.healthy = true;
        self.failure_count = 0;
        self.last_failure_at = None;

        (!was_healthy).then_some(Transition::Closed)
    }

    pub fn record_failure(&mut self, now_ms: u64, threshold: u32) -> Option<Transition> {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure_at = Some(now_ms);

        if self.failure_count >= threshold && self.healthy {
            self.healthy = false;
            return Some(Transition::Opened);
        }
        None
    }

    /// True once more than `reset_timeout` has passed since the last failure.
    pub fn should_reset(&self, now_ms: u64, reset_timeout: Duration) -> bool {
        match self.last_failure_at {
            Some(at) => now_ms.saturating_sub(at) > reset_timeout.as_millis() as u64,
            None => false,
        }
    }

    pub fn admit(&mut self, now_ms: u64, reset_timeout: Duration) -> Admission {
        if self.healthy {
            return Admission::Allowed;
        }

        if self.should_reset(now_ms, reset_timeout) {
            self.healthy = true;
            self.failure_count = 0;
            return Admission::HalfOpen;
        }

        Admission::Denied
    }

    pub fn snapshot(&self, now_ms: u64, reset_timeout: Duration) -> HealthStatus {
        HealthStatus {
            healthy: self.healthy,
            failure_count: self.failure_count,
            last_failure_at: self.last_failure_at,
            would_reset: self.should_reset(now_ms, reset_timeout),
        }
    }
}
