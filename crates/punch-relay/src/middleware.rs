//! Relay middleware.

use std::time::Instant;

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderName, HeaderValue, Request, Response};
use axum::middleware::Next;
use tracing::{info, warn, Span};
use uuid::Uuid;

/// Methods advertised to browsers.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Permissive CORS headers on every response, including errors and 404s.
pub async fn cors_headers(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));

    response
}

/// Header carrying the per-request correlation id.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Endpoints answered by the relay itself and left out of the request log.
const LOCAL_PATHS: [&str; 2] = ["/health", "/metrics"];

/// Correlation id for one relayed exchange.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Reuse the caller's `X-Request-ID` when it is printable, mint one otherwise,
/// and echo it on the response.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response<Body> {
    let id = match request.headers().get(&X_REQUEST_ID).map(HeaderValue::to_str) {
        Some(Ok(id)) => id.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };

    Span::current().record("request_id", id.as_str());
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}

/// One log line per relayed exchange; server errors are logged as warnings.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    if LOCAL_PATHS.contains(&uri.path()) {
        return response;
    }

    let request_id = response
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    if status.is_server_error() {
        warn!(%method, %uri, %request_id, status = status.as_u16(), elapsed_ms, "Relay exchange failed");
    } else {
        info!(%method, %uri, %request_id, status = status.as_u16(), elapsed_ms, "Relay exchange completed");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    fn echo_id_app() -> Router {
        Router::new()
            .route("/", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
            .layer(from_fn(request_id))
    }

    #[tokio::test]
    async fn test_inbound_request_id_is_kept() {
        let response = echo_id_app()
            .oneshot(Request::get("/").header("x-request-id", "kiosk-7").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "kiosk-7");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"kiosk-7");
    }

    #[tokio::test]
    async fn test_missing_request_id_is_minted() {
        let response = echo_id_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
