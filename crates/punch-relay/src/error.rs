//! Relay error types.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

/// Failures while forwarding a request.
///
/// Every variant is answered with the same envelope; only `details` differs.
/// The status is `500`, except `413` for a request body over the inbound limit.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid backend URL: {0}")]
    Config(String),

    #[error("Invalid target URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("Failed to read request body: {0}")]
    RequestBody(#[from] BytesRejection),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Backend response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "config",
            RelayError::InvalidTarget(_) => "invalid_target",
            RelayError::RequestBody(_) if self.is_body_too_large() => "request_too_large",
            RelayError::RequestBody(_) => "request_body",
            RelayError::Upstream(e) if e.is_timeout() => "timeout",
            RelayError::Upstream(e) if e.is_connect() => "connect",
            RelayError::Upstream(_) => "upstream",
            RelayError::ResponseTooLarge { .. } => "response_too_large",
            RelayError::Internal(_) => "internal",
        }
    }

    fn is_body_too_large(&self) -> bool {
        matches!(self, RelayError::RequestBody(r) if r.status() == StatusCode::PAYLOAD_TOO_LARGE)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    details: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = if self.is_body_too_large() {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorResponse {
            error: "Proxy request failed",
            details: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
