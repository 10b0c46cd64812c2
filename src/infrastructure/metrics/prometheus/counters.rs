use metrics::{counter, histogram};
use std::time::Instant;

/// Track gateway request latency, labelled by method and status.
pub fn track_http_request(start: Instant, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "ecorg_client_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
    counter!("ecorg_client_requests_total", "method" => method.to_string()).increment(1);
}

/// Increment a counter for 401 answers that cleared the credential.
pub fn increment_auth_rejected() {
    counter!("ecorg_client_auth_rejected_total").increment(1);
}

/// Increment a counter for rolled-back optimistic changes.
pub fn increment_rollback(kind: &str) {
    counter!("ecorg_client_rollbacks_total", "entity" => kind.to_string()).increment(1);
}
