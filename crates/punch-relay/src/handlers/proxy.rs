//! The forwarding handler.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{FromRequest, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::error::{RelayError, RelayResult};
use crate::metrics;
use crate::state::AppState;
use crate::target::{is_under_prefix, resolve_target};

/// Inbound headers copied to the backend request. Everything else is dropped.
pub const FORWARDED_HEADERS: [HeaderName; 2] = [CONTENT_TYPE, AUTHORIZATION];

/// Forward any request under the mount prefix to the backend.
///
/// Preflights are answered locally. Every failure is answered with the
/// relay's error envelope: `413` for an oversized request body, `500` for
/// anything else.
pub async fn forward(State(state): State<AppState>, request: Request<Body>) -> Response {
    if !is_under_prefix(request.uri().path(), &state.config.mount_prefix) {
        return StatusCode::NOT_FOUND.into_response();
    }

    if request.method() == Method::OPTIONS {
        metrics::record_preflight();
        return StatusCode::OK.into_response();
    }

    let method = request.method().clone();
    let uri = request.uri().clone();

    match relay(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(method = %method, uri = %uri, kind = e.kind(), "Proxy request failed: {}", e);
            metrics::record_upstream_failure(e.kind());
            e.into_response()
        }
    }
}

async fn relay(state: &AppState, request: Request<Body>) -> RelayResult<Response> {
    let method = request.method().clone();
    let target = resolve_target(&state.backend, &state.config.mount_prefix, request.uri())?;

    let mut outbound = state.http.request(method.clone(), target.clone());
    for name in FORWARDED_HEADERS.iter() {
        if let Some(value) = request.headers().get(name) {
            outbound = outbound.header(name, value.clone());
        }
    }

    if !matches!(method, Method::GET | Method::HEAD) {
        // Bounded by the router's RequestBodyLimitLayer.
        let body = Bytes::from_request(request, &()).await?;
        debug!(bytes = body.len(), "Forwarding request body");
        outbound = outbound.body(body);
    }

    let start = Instant::now();
    let upstream = outbound.send().await?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let payload = read_limited(upstream, state.config.max_response_size).await?;

    metrics::record_upstream(
        method.as_str(),
        status.as_u16(),
        start.elapsed().as_secs_f64(),
    );
    debug!(
        method = %method,
        target = %target,
        status = status.as_u16(),
        bytes = payload.len(),
        "Backend responded"
    );

    let mut response = Response::builder().status(status);
    if let Some(content_type) = content_type {
        response = response.header(CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from(payload))
        .map_err(|e| RelayError::Internal(e.to_string()))
}

/// Buffer the backend body, failing once it grows past `limit` bytes.
async fn read_limited(mut upstream: reqwest::Response, limit: usize) -> RelayResult<Bytes> {
    if upstream.content_length().is_some_and(|len| len > limit as u64) {
        return Err(RelayError::ResponseTooLarge { limit });
    }

    let mut buf = BytesMut::new();
    while let Some(chunk) = upstream.chunk().await? {
        if buf.len() + chunk.len() > limit {
            return Err(RelayError::ResponseTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}
