//! Passive health checking (request outcome ingestion).
//!
//! # Responsibilities
//! - Observe request outcomes
//! - Feed availability signals into the circuit state
//! - Trigger an immediate probe when a request fails for availability reasons
//!
//! # Design Decisions
//! - Connection errors, timeouts, 5xx and 404 are failures
//! - 401 and other 4xx say nothing about availability
//! - The follow-up probe runs in the background and never delays the caller

use tokio::task::JoinHandle;

use crate::health::monitor::HealthMonitor;

/// What a request outcome says about backend availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    Reachable,
    Unreachable,
    Neutral,
}

impl HealthMonitor {
    /// Apply a request outcome.
    ///
    /// `Unreachable` records a failure and starts a background probe, whose
    /// handle is returned. Must be called from within a Tokio runtime.
    pub fn observe(&self, signal: HealthSignal) -> Option<JoinHandle<bool>> {
        match signal {
            HealthSignal::Reachable => {
                self.mark_healthy();
                None
            }
            HealthSignal::Unreachable => {
                self.mark_unhealthy();
                Some(self.spawn_health_check())
            }
            HealthSignal::Neutral => None,
        }
    }

    /// Run `force_health_check` on a background task.
    pub fn spawn_health_check(&self) -> JoinHandle<bool> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.force_health_check().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::monitor::tests::monitor_with;

    #[tokio::test]
    async fn test_unreachable_marks_and_probes() {
        let (monitor, _) = monitor_with(3, 120_000);

        let probe = monitor.observe(HealthSignal::Unreachable).unwrap();
        assert_eq!(monitor.status().failure_count, 1);

        // Probe against a closed port fails and records a second failure.
        assert!(!probe.await.unwrap());
        assert_eq!(monitor.status().failure_count, 2);
    }

    #[tokio::test]
    async fn test_reachable_and_neutral() {
        let (monitor, _) = monitor_with(2, 120_000);
        monitor.mark_unhealthy();

        assert!(monitor.observe(HealthSignal::Neutral).is_none());
        assert_eq!(monitor.status().failure_count, 1);

        assert!(monitor.observe(HealthSignal::Reachable).is_none());
        assert_eq!(monitor.status().failure_count, 0);
    }
}
