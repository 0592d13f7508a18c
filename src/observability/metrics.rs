//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_upstream_requests_total` (counter): forwards by outcome
//! - `proxy_upstream_duration_seconds` (histogram): time from inbound
//!   request to upstream reply or failure, by outcome
//!
//! Recording is always on; without an installed exporter the `metrics`
//! macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Result of one forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Install the Prometheus recorder with a scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one upstream forward.
pub fn record_upstream(outcome: Outcome, start: Instant) {
    let outcome = outcome.as_str();
    metrics::counter!("proxy_upstream_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("proxy_upstream_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
