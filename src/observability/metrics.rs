//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency by method, route, status
//! - `fanout_runs_total` (counter): fan-out runs by mode and outcome
//! - `fanout_duration_seconds` (histogram): successful fan-out wall time by mode
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::fanout::FanOutMode;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled HTTP request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a fan-out run. `elapsed` is `None` when the run failed.
pub fn record_fanout(mode: FanOutMode, elapsed: Option<Duration>) {
    let mode = mode.to_string();
    let outcome = if elapsed.is_some() { "success" } else { "failure" };
    counter!("fanout_runs_total", "mode" => mode.clone(), "outcome" => outcome).increment(1);
    if let Some(elapsed) = elapsed {
        histogram!("fanout_duration_seconds", "mode" => mode).record(elapsed.as_secs_f64());
    }
}
