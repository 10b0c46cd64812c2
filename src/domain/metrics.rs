use std::sync::Arc;
use std::time::Instant;

/// Abstraction for client metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record one completed gateway request. `status` is 0 when no response arrived.
    fn record_request(&self, start: Instant, method: &str, status: u16);

    /// Record a 401 answer that cleared the stored credential.
    fn record_auth_rejected(&self);

    /// Record an optimistic change that was rolled back.
    fn record_rollback(&self, kind: &str);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
