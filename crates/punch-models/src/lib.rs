//! Shared data models for the Punchclock attendance client.
//!
//! This crate provides Serde-serializable types for:
//! - Captured frames and the submission direction (punch in / punch out)
//! - Recognition outcomes reported by the backend
//! - Users, roles and the permanent-admin access policy
//! - Attendance ledger records and per-user summaries

pub mod access;
pub mod attendance;
pub mod error;
pub mod frame;
pub mod mode;
pub mod outcome;
pub mod timestamp;
pub mod user;

// Re-export common types
pub use access::AccessPolicy;
pub use attendance::{summarize, AttendanceRecord, AttendanceSummary, PresenceStatus, Stats};
pub use error::{ModelError, ModelResult};
pub use frame::Frame;
pub use mode::{GateState, SubmissionMode};
pub use outcome::{RecognizedUser, Recognition, RejectReason, Rejection, SubmissionOutcome};
pub use user::{RegistrationForm, Role, UserId, UserRecord};
