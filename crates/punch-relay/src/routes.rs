//! Relay routes.

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::handlers::{forward, health};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_headers, request_id, request_logging};
use crate::state::AppState;

/// Create the relay router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let health_routes = Router::new().route("/health", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        // Everything else is relayed; `forward` answers 404 outside the mount prefix.
        .fallback(forward)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "relay",
                method = %request.method(),
                uri = %request.uri(),
                request_id = Empty,
            )
        }))
        .layer(middleware::from_fn(cors_headers))
        .with_state(state)
}
