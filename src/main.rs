//! Backend Gate daemon.
//!
//! Bootstraps the client context, polls backend health and logs every
//! transition until SIGINT/SIGTERM.
//!
//! ```text
//!    ┌──────────────┐  probe /up   ┌──────────┐
//!    │HealthMonitor │─────────────▶│ backend  │
//!    └──────┬───────┘              └──────────┘
//!           │ backendHealthChange
//!           ▼
//!    ┌──────────────┐  trigger   ┌──────────────┐
//!    │ event logger │◀───────────│   Shutdown   │◀── signals
//!    └──────────────┘            └──────────────┘
//! ```
//!
//! Configuration is read from the file named by `BACKEND_GATE_CONFIG`;
//! built-in defaults apply when it is unset.

use std::path::PathBuf;

use backend_gate::config::loader::load_config;
use backend_gate::config::ClientConfig;
use backend_gate::health::HEALTH_CHANGE_EVENT;
use backend_gate::lifecycle::{wait_for_shutdown_signal, ClientContext, Shutdown};
use backend_gate::observability::{logging, metrics};

const CONFIG_ENV: &str = "BACKEND_GATE_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("backend-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?config_path,
        base_url = %config.backend.base_url,
        interval_secs = config.health_check.interval_secs,
        failure_threshold = config.health_check.failure_threshold,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let ctx = ClientContext::init(config)?;
    let shutdown = Shutdown::new();

    let mut events = ctx.monitor().subscribe();
    let mut stop = shutdown.subscribe();
    let logger = tokio::spawn(async move {
        loop {
            tokio::select! {
                change = events.recv() => match change {
                    Some(change) => tracing::info!(
                        event = HEALTH_CHANGE_EVENT,
                        is_healthy = change.is_healthy,
                        timestamp = change.timestamp,
                        "Backend health changed"
                    ),
                    None => break,
                },
                _ = stop.recv() => break,
            }
        }
    });

    ctx.start();
    wait_for_shutdown_signal().await;

    shutdown.trigger();
    ctx.shutdown();
    let _ = logger.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
