//! Recognition outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mode::SubmissionMode;
use crate::user::{Role, UserId};

/// Message shown when the backend gives no usable explanation.
pub const GENERIC_FAILURE: &str = "Recognition failed. Please try again.";

/// Identity the backend matched a frame to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// An accepted attendance punch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Human-readable confirmation from the backend
    pub message: String,
    pub user: RecognizedUser,
    pub mode: SubmissionMode,
    /// Backend timestamp when supplied, otherwise the time the reply arrived
    pub server_timestamp: DateTime<Utc>,
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// The backend answered with a non-2xx status (no match, bad image, business rule).
    Declined { status: u16, detail: String },
    /// The backend could not be reached or did not answer in time.
    Transport { message: String },
    /// The backend answered 2xx but the body was not a recognition.
    InvalidResponse { message: String },
}

/// A declined submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub mode: SubmissionMode,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn new(mode: SubmissionMode, reason: RejectReason) -> Self {
        Self { mode, reason }
    }

    /// Text suitable for showing to the operator.
    ///
    /// Backend `detail` messages are surfaced verbatim; anything else is
    /// reported with the generic failure text.
    pub fn user_message(&self) -> &str {
        match &self.reason {
            RejectReason::Declined { detail, .. } if !detail.trim().is_empty() => detail,
            _ => GENERIC_FAILURE,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            RejectReason::Declined { status, detail } => {
                write!(f, "{} declined ({}): {}", self.mode, status, detail)
            }
            RejectReason::Transport { message } => {
                write!(f, "{} transport failure: {}", self.mode, message)
            }
            RejectReason::InvalidResponse { message } => {
                write!(f, "{} invalid response: {}", self.mode, message)
            }
        }
    }
}

/// Classified result of one recognition round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Accepted(Recognition),
    Rejected(Rejection),
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted(_))
    }

    pub fn mode(&self) -> SubmissionMode {
        match self {
            SubmissionOutcome::Accepted(recognition) => recognition.mode,
            SubmissionOutcome::Rejected(rejection) => rejection.mode,
        }
    }

    pub fn into_result(self) -> Result<Recognition, Rejection> {
        match self {
            SubmissionOutcome::Accepted(recognition) => Ok(recognition),
            SubmissionOutcome::Rejected(rejection) => Err(rejection),
        }
    }
}

impl From<Result<Recognition, Rejection>> for SubmissionOutcome {
    fn from(result: Result<Recognition, Rejection>) -> Self {
        match result {
            Ok(recognition) => SubmissionOutcome::Accepted(recognition),
            Err(rejection) => SubmissionOutcome::Rejected(rejection),
        }
    }
}
