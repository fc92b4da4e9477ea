//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops unless the host
//! process installs a recorder.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const SAMPLER_CAPTURES_TOTAL: &str = "punch_sampler_captures_total";
    pub const GATE_ADMISSIONS_TOTAL: &str = "punch_gate_admissions_total";
    pub const GATE_OUTCOMES_TOTAL: &str = "punch_gate_outcomes_total";
    pub const MANUAL_SUBMISSIONS_TOTAL: &str = "punch_manual_submissions_total";
}

/// Record one sampler tick.
pub fn record_capture(frame_ready: bool) {
    let labels = [("result", if frame_ready { "frame" } else { "not_ready" }.to_string())];
    counter!(names::SAMPLER_CAPTURES_TOTAL, &labels).increment(1);
}

/// Record the gate's verdict on an offered frame.
pub fn record_admission(verdict: &str) {
    let labels = [("verdict", verdict.to_string())];
    counter!(names::GATE_ADMISSIONS_TOTAL, &labels).increment(1);
}

/// Record a live-mode outcome (`accepted`, `stale`, `rejected`).
pub fn record_outcome(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::GATE_OUTCOMES_TOTAL, &labels).increment(1);
}

/// Record a manual submission.
pub fn record_manual(accepted: bool) {
    let labels = [("outcome", if accepted { "accepted" } else { "rejected" }.to_string())];
    counter!(names::MANUAL_SUBMISSIONS_TOTAL, &labels).increment(1);
}
