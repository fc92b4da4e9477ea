//! Scanner and kiosk configuration.

use std::path::PathBuf;
use std::time::Duration;

use punch_models::SubmissionMode;
use tracing::warn;

/// Live scanning parameters.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Time between the end of one capture and the start of the next
    pub period: Duration,
    /// Minimum time after an accepted punch before another frame may be submitted
    pub cooldown: Duration,
    /// Initial punch direction
    pub mode: SubmissionMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(2000),
            cooldown: Duration::from_millis(5000),
            mode: SubmissionMode::In,
        }
    }
}

impl ScanConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            period: env_millis("SCAN_PERIOD_MS").unwrap_or(defaults.period),
            cooldown: env_millis("SCAN_COOLDOWN_MS").unwrap_or(defaults.cooldown),
            mode: std::env::var("SCAN_MODE")
                .ok()
                .and_then(|s| match s.parse() {
                    Ok(mode) => Some(mode),
                    Err(e) => {
                        warn!("Ignoring SCAN_MODE: {}", e);
                        None
                    }
                })
                .unwrap_or(defaults.mode),
        }
    }
}

/// Kiosk binary configuration.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Still image kept current by the camera daemon
    pub frame_path: PathBuf,
    /// How long an accepted punch is displayed before scanning resumes
    pub resume_after: Duration,
    pub scan: ScanConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            frame_path: PathBuf::from("/run/punchclock/frame.jpg"),
            resume_after: Duration::from_secs(5),
            scan: ScanConfig::default(),
        }
    }
}

impl KioskConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            frame_path: std::env::var("KIOSK_FRAME_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.frame_path),
            resume_after: std::env::var("KIOSK_RESUME_AFTER_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.resume_after),
            scan: ScanConfig::from_env(),
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms: &u64| *ms > 0)
        .map(Duration::from_millis)
}
