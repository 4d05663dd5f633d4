//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_requests_total` (counter): requests by channel, outcome
//! - `client_admission_denied_total` (counter): calls rejected by the open circuit
//! - `client_backend_health` (gauge): 1=healthy, 0=unhealthy
//! - `client_circuit_transitions_total` (counter): transitions by target state
//! - `client_health_probes_total` (counter): liveness probes by result
//! - `client_retries_total` (counter): retry attempts made by the retry wrapper
//! - `client_credential_purges_total` (counter): stored tokens removed, by reason
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(channel: &'static str, outcome: &'static str) {
    metrics::counter!("client_requests_total", "channel" => channel, "outcome" => outcome)
        .increment(1);
}

pub fn record_admission_denied(channel: &'static str) {
    metrics::counter!("client_admission_denied_total", "channel" => channel).increment(1);
}

pub fn record_backend_health(healthy: bool) {
    metrics::gauge!("client_backend_health").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_circuit_transition(healthy: bool) {
    let to = if healthy { "closed" } else { "open" };
    metrics::counter!("client_circuit_transitions_total", "to" => to).increment(1);
}

pub fn record_probe(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("client_health_probes_total", "result" => result).increment(1);
}

pub fn record_retry() {
    metrics::counter!("client_retries_total").increment(1);
}

pub fn record_credential_purge(reason: &'static str) {
    metrics::counter!("client_credential_purges_total", "reason" => reason).increment(1);
}
