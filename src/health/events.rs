//! Health-change notifications.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Name listeners know the notification by.
pub const HEALTH_CHANGE_EVENT: &str = "backendHealthChange";

/// Payload broadcast on every healthy/unhealthy transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthChange {
    pub is_healthy: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// A registered listener. Dropping it unsubscribes.
///
/// Only transitions that happen while the subscription exists are delivered;
/// call `HealthMonitor::status` to catch up on the current state.
#[derive(Debug)]
pub struct HealthSubscription {
    rx: broadcast::Receiver<HealthChange>,
}

impl HealthSubscription {
    pub(crate) fn new(rx: broadcast::Receiver<HealthChange>) -> Self {
        Self { rx }
    }

    /// Wait for the next transition. `None` once the monitor is gone.
    pub async fn recv(&mut self) -> Option<HealthChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Health listener lagged, oldest changes dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The next pending transition, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<HealthChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let change = HealthChange {
            is_healthy: false,
            timestamp: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_string(&change).unwrap(),
            r#"{"isHealthy":false,"timestamp":1700000000000}"#
        );
    }

    #[tokio::test]
    async fn test_recv_and_close() {
        let (tx, rx) = broadcast::channel(4);
        let mut sub = HealthSubscription::new(rx);
        assert!(sub.try_recv().is_none());

        let change = HealthChange { is_healthy: true, timestamp: 1 };
        tx.send(change).unwrap();
        assert_eq!(sub.recv().await, Some(change));

        drop(tx);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn test_unsubscribe_drops_receiver() {
        let (tx, rx) = broadcast::channel::<HealthChange>(4);
        let sub = HealthSubscription::new(rx);
        assert_eq!(tx.receiver_count(), 1);
        sub.unsubscribe();
        assert_eq!(tx.receiver_count(), 0);
    }
}
