//! Prometheus metrics for the relay.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // Inbound HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "punch_relay_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "punch_relay_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "punch_relay_http_requests_in_flight";

    // Backend metrics
    pub const UPSTREAM_REQUESTS_TOTAL: &str = "punch_relay_upstream_requests_total";
    pub const UPSTREAM_DURATION_SECONDS: &str = "punch_relay_upstream_duration_seconds";
    pub const UPSTREAM_FAILURES_TOTAL: &str = "punch_relay_upstream_failures_total";
    pub const PREFLIGHTS_TOTAL: &str = "punch_relay_preflights_total";
}

/// Record an inbound HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed backend round trip.
pub fn record_upstream(method: &str, status: u16, duration_secs: f64) {
    let labels = [("method", method.to_string()), ("status", status.to_string())];
    counter!(names::UPSTREAM_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::UPSTREAM_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a request that could not be relayed.
pub fn record_upstream_failure(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::UPSTREAM_FAILURES_TOTAL, &labels).increment(1);
}

/// Record a preflight answered locally.
pub fn record_preflight() {
    counter!(names::PREFLIGHTS_TOTAL).increment(1);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    static UUID: OnceLock<Option<Regex>> = OnceLock::new();
    static NUMERIC: OnceLock<Option<Regex>> = OnceLock::new();

    let mut path = path.to_string();
    if let Some(re) = UUID
        .get_or_init(|| Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").ok())
    {
        path = re.replace_all(&path, ":id").into_owned();
    }
    if let Some(re) = NUMERIC.get_or_init(|| Regex::new(r"/[0-9]+(/|$)").ok()) {
        path = re.replace_all(&path, "/:id$1").into_owned();
    }
    path
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/proxy/users/42"), "/api/proxy/users/:id");
        assert_eq!(sanitize_path("/api/proxy/users/42/photo"), "/api/proxy/users/:id/photo");
        assert_eq!(
            sanitize_path("/api/proxy/users/550e8400-e29b-41d4-a716-446655440000"),
            "/api/proxy/users/:id"
        );
        assert_eq!(sanitize_path("/api/proxy/stats"), "/api/proxy/stats");
    }
}
