//! Capture error types.

use punch_models::Rejection;
use thiserror::Error;

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Failures surfaced to the operator by manual capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera is not ready")]
    DeviceNotReady,

    #[error("{}", .0.user_message())]
    Rejected(Rejection),
}

impl From<Rejection> for CaptureError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}
