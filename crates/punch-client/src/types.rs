//! Backend request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use punch_models::{RecognizedUser, Role, UserRecord};

/// Successful reply from `POST /recognize`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub message: String,
    pub user: RecognizedUser,
    #[serde(default, deserialize_with = "punch_models::timestamp::deserialize_opt_utc")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Error body returned with non-2xx replies.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Result of a successful enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Role the user was registered with, after the access policy was applied
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// User record, when the backend echoes it back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_response_without_timestamp() {
        let json = r#"{"message": "Attendance marked", "user": {"name": "Ada", "role": "employee", "id": 3}}"#;
        let parsed: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.message, "Attendance marked");
        assert_eq!(parsed.user.name, "Ada");
        assert!(parsed.timestamp.is_none());
    }

    #[test]
    fn test_recognize_response_with_naive_timestamp() {
        let json = r#"{"message": "ok", "user": {"name": "Bo"}, "timestamp": "2024-03-05T09:00:00"}"#;
        let parsed: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.timestamp.is_some());
        assert_eq!(parsed.user.role, Role::Employee);
    }
}
