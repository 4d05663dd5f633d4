//! Health monitor lifecycle and event delivery against a live mock backend.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backend_gate::health::{HealthChange, HealthSubscription};
use backend_gate::lifecycle::ClientContext;
use common::{config_for, eventually, start_mock_backend, start_programmable_backend};

async fn next_event(subscription: &mut HealthSubscription) -> Option<HealthChange> {
    tokio::time::timeout(Duration::from_secs(2), subscription.recv()).await.ok().flatten()
}

/// Backend whose `/up` answer follows the returned flag.
async fn switchable_backend() -> (common::MockBackend, Arc<AtomicBool>) {
    let up = Arc::new(AtomicBool::new(true));
    let flag = up.clone();
    let backend = start_programmable_backend(move |_| {
        let status = if flag.load(Ordering::SeqCst) { 200 } else { 503 };
        async move { (status, "{}".to_string()) }
    })
    .await;
    (backend, up)
}

#[tokio::test]
async fn test_first_probe_is_immediate() {
    let backend = start_mock_backend("{}").await;
    let ctx = ClientContext::init(config_for(&backend)).unwrap();

    ctx.start();
    assert!(ctx.monitor().is_monitoring());
    assert!(eventually(Duration::from_secs(2), || backend.hits("/up") == 1).await);

    let probe = &backend.requests()[0];
    assert_eq!(probe.method, "GET");
    assert_eq!(probe.header("user-agent"), Some("backend-gate-health-check"));
    ctx.shutdown();
}

#[tokio::test]
async fn test_restart_does_not_duplicate_timers() {
    let backend = start_mock_backend("{}").await;
    let mut config = config_for(&backend);
    config.health_check.interval_secs = 1;
    let ctx = ClientContext::init(config).unwrap();

    ctx.monitor().start_monitoring();
    ctx.monitor().start_monitoring();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    ctx.monitor().stop_monitoring();

    // One timer: probes at 0s and 1s, plus at most one from the replaced timer.
    let probes = backend.hits("/up");
    assert!((2..=3).contains(&probes), "unexpected probe count {}", probes);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let backend = start_mock_backend("{}").await;
    let ctx = ClientContext::init(config_for(&backend)).unwrap();

    ctx.monitor().stop_monitoring();
    ctx.start();
    ctx.monitor().stop_monitoring();
    ctx.monitor().stop_monitoring();
    assert!(!ctx.monitor().is_monitoring());

    ctx.start();
    assert!(ctx.monitor().is_monitoring());
    ctx.shutdown();
}

#[tokio::test]
async fn test_transitions_emit_one_event_each() {
    let (backend, up) = switchable_backend().await;
    let ctx = ClientContext::init(config_for(&backend)).unwrap();
    let mut events = ctx.monitor().subscribe();

    up.store(false, Ordering::SeqCst);
    assert!(!ctx.monitor().force_health_check().await);
    assert!(ctx.monitor().is_healthy());
    assert!(!ctx.monitor().force_health_check().await);
    assert!(!ctx.monitor().is_healthy());
    // Further failures while open stay silent.
    ctx.monitor().force_health_check().await;

    let opened = next_event(&mut events).await.unwrap();
    assert!(!opened.is_healthy);
    assert!(events.try_recv().is_none());

    up.store(true, Ordering::SeqCst);
    assert!(ctx.monitor().force_health_check().await);
    ctx.monitor().force_health_check().await;

    let closed = next_event(&mut events).await.unwrap();
    assert!(closed.is_healthy);
    assert!(closed.timestamp >= opened.timestamp);
    assert!(events.try_recv().is_none());
    assert_eq!(ctx.monitor().status().failure_count, 0);
}

#[tokio::test]
async fn test_cooldown_admits_half_open_request() {
    let (backend, up) = switchable_backend().await;
    let mut config = config_for(&backend);
    config.health_check.reset_timeout_secs = 1;
    let ctx = ClientContext::init(config).unwrap();
    let mut events = ctx.monitor().subscribe();

    up.store(false, Ordering::SeqCst);
    ctx.monitor().force_health_check().await;
    ctx.monitor().force_health_check().await;
    assert!(!ctx.monitor().can_make_request());
    assert!(!next_event(&mut events).await.unwrap().is_healthy);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(ctx.monitor().status().would_reset);
    assert!(ctx.monitor().can_make_request());
    assert!(next_event(&mut events).await.unwrap().is_healthy);

    // The failed request and its follow-up probe re-open the circuit.
    ctx.client().secured().get("/api/me").await.unwrap_err();
    assert!(eventually(Duration::from_secs(2), || !ctx.monitor().is_healthy()).await);
}

#[tokio::test]
async fn test_unsubscribed_listener_is_dropped() {
    let backend = start_mock_backend("{}").await;
    let ctx = ClientContext::init(config_for(&backend)).unwrap();

    let first = ctx.monitor().subscribe();
    let _second = ctx.monitor().subscribe();
    assert_eq!(ctx.monitor().listener_count(), 2);

    first.unsubscribe();
    assert_eq!(ctx.monitor().listener_count(), 1);
}
