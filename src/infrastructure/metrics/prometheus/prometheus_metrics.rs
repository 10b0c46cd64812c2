//! Prometheus metrics implementation.
//!
//! Delegates to the utility functions in `counters.rs` and `recorder.rs`,
//! which record into the global `metrics` crate registry. A single global
//! handle renders everything in Prometheus text format.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// This struct is empty because all metrics go through the global
/// registry via `counter!()` and `histogram!()`.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_request(&self, start: Instant, method: &str, status: u16) {
        super::track_http_request(start, method, status);
    }

    fn record_auth_rejected(&self) {
        tracing::debug!("Recording auth rejection");
        super::increment_auth_rejected();
    }

    fn record_rollback(&self, kind: &str) {
        tracing::debug!("Recording {} rollback", kind);
        super::increment_rollback(kind);
    }
}
