//! Submission direction and scanner state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Attendance direction selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubmissionMode {
    /// Punch in
    #[default]
    #[serde(rename = "IN")]
    In,
    /// Punch out
    #[serde(rename = "OUT")]
    Out,
}

impl SubmissionMode {
    /// Wire representation, as sent in the multipart `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionMode::In => "IN",
            SubmissionMode::Out => "OUT",
        }
    }
}

impl std::fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubmissionMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(SubmissionMode::In),
            "OUT" => Ok(SubmissionMode::Out),
            _ => Err(ModelError::InvalidMode(s.to_string())),
        }
    }
}

/// Whether sampled frames may reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Frames are eligible for submission
    #[default]
    Scanning,
    /// A recognition was accepted; frames are discarded until resumed
    Paused,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Scanning => "scanning",
            GateState::Paused => "paused",
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self, GateState::Scanning)
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
