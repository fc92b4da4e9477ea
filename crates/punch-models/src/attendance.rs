//! Attendance ledger records and per-user summaries.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::mode::SubmissionMode;
use crate::user::UserId;

/// One punch recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: UserId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub mode: SubmissionMode,
    #[serde(deserialize_with = "crate::timestamp::deserialize_utc")]
    pub timestamp: DateTime<Utc>,
}

/// Presence derived from today's punches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    CheckedIn,
    CheckedOut,
    Absent,
}

impl PresenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PresenceStatus::CheckedIn => "Checked In",
            PresenceStatus::CheckedOut => "Checked Out",
            PresenceStatus::Absent => "Absent",
        }
    }
}

/// Summary of one user's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Distinct calendar days with at least one punch
    pub days_present: usize,
    pub current_status: PresenceStatus,
    pub last_punch: Option<DateTime<Utc>>,
}

/// Summarize `user_id`'s punches as of `today`.
pub fn summarize(records: &[AttendanceRecord], user_id: &UserId, today: NaiveDate) -> AttendanceSummary {
    let mine: Vec<&AttendanceRecord> = records.iter().filter(|r| &r.user_id == user_id).collect();

    let days_present = mine
        .iter()
        .map(|r| r.timestamp.date_naive())
        .collect::<HashSet<_>>()
        .len();

    let latest_today = mine
        .iter()
        .filter(|r| r.timestamp.date_naive() == today)
        .max_by_key(|r| r.timestamp);

    let current_status = match latest_today.map(|r| r.mode) {
        Some(SubmissionMode::In) => PresenceStatus::CheckedIn,
        Some(SubmissionMode::Out) => PresenceStatus::CheckedOut,
        None => PresenceStatus::Absent,
    };

    AttendanceSummary {
        days_present,
        current_status,
        last_punch: mine.iter().map(|r| r.timestamp).max(),
    }
}

/// Aggregate counters from the backend's `/stats` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub users_by_role: BTreeMap<String, u64>,
    #[serde(default)]
    pub users_by_department: BTreeMap<String, u64>,
}

impl Stats {
    pub fn users_with_role(&self, role: &str) -> u64 {
        self.users_by_role.get(role).copied().unwrap_or(0)
    }
}
