//! Client error types.

use punch_models::outcome::GENERIC_FAILURE;
use punch_models::{ModelError, RejectReason, Rejection, SubmissionMode};
use thiserror::Error;

use crate::types::ErrorBody;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Backend rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClientError {
    /// Build an error from a non-2xx reply.
    ///
    /// The backend explains failures in a JSON `detail` field; when it is
    /// missing the generic failure message is used.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        Self::Rejected { status, detail }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify this error as a rejected recognition.
    pub fn into_rejection(self, mode: SubmissionMode) -> Rejection {
        let reason = match self {
            ClientError::Rejected { status, detail } => RejectReason::Declined { status, detail },
            ClientError::Network(e) => RejectReason::Transport { message: e.to_string() },
            other => RejectReason::InvalidResponse { message: other.to_string() },
        };
        Rejection::new(mode, reason)
    }
}

impl From<ModelError> for ClientError {
    fn from(error: ModelError) -> Self {
        Self::Validation(error.to_string())
    }
}
