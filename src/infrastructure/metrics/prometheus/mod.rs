mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Re-export utilities for internal use within this module
pub(crate) use counters::{increment_auth_rejected, increment_rollback, track_http_request};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates a new Prometheus metrics implementation.
///
/// Installs the global recorder on first use. Rendered output is exposed
/// through [`crate::domain::Metrics::render`].
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics()?;

    Ok(Arc::new(PrometheusMetrics::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_create_is_repeatable_and_renders() {
        let metrics = create().unwrap();
        let _again = create().unwrap();

        metrics.record_request(Instant::now(), "GET", 200);
        metrics.record_auth_rejected();
        metrics.record_rollback("report");

        let text = metrics.render();
        assert!(text.contains("ecorg_client_auth_rejected_total"));
        assert!(text.contains("ecorg_client_rollbacks_total"));
    }
}
