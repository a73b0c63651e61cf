//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): latency by method
//! - `proxy_upstream_failures_total` (counter): transport failures
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure() {
    ::metrics::counter!("proxy_upstream_failures_total").increment(1);
}
