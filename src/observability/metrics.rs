//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//!
//! # Design Decisions
//! - Recording is a no-op until the exporter is installed, so the library
//!   can be used (and tested) without a metrics endpoint
//! - Labels stay low-cardinality: route name, method, status code

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and describe the gateway metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "gateway_requests_total",
                "Total requests by method, status and route"
            );
            describe_histogram!(
                "gateway_request_duration_seconds",
                "Request latency in seconds by route"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(error) => {
            tracing::error!(address = %addr, error = %error, "Failed to install metrics exporter");
        }
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, route: &str, start_time: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);

    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start_time.elapsed().as_secs_f64());
}
