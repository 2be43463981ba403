//! Prometheus metrics for monitoring the flashdeck server.
//!
//! Counters are recorded through the `metrics` facade. Until
//! [`init_metrics`] installs the exporter they are no-ops, so handlers can
//! record unconditionally.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use fd_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/login", 200);
//! ```

use flashdeck::Performance;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment registrations counter.
pub fn registrations_total() {
    metrics::counter!("registrations_total").increment(1);
}

// ============================================================================
// Review Metrics
// ============================================================================

/// Increment reviews counter, labelled by grade.
pub fn reviews_total(performance: Performance) {
    metrics::counter!("reviews_total",
        "performance" => performance.as_str()
    )
    .increment(1);
}

/// Increment counter of reviews abandoned after repeated write conflicts.
pub fn review_conflicts_total() {
    metrics::counter!("review_conflicts_total").increment(1);
}
