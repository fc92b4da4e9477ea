//! Relay configuration.

use std::time::Duration;

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Backend origin every request is forwarded to
    pub backend_url: String,
    /// Path prefix the relay is mounted under (normalized, no trailing slash)
    pub mount_prefix: String,
    /// Upper bound on one backend round trip
    pub upstream_timeout: Duration,
    /// Max inbound request body size
    pub max_body_size: usize,
    /// Max buffered backend response size
    pub max_response_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            backend_url: "http://127.0.0.1:8000".to_string(),
            mount_prefix: "/api/proxy".to_string(),
            upstream_timeout: Duration::from_secs(15),
            max_body_size: 10 * 1024 * 1024,     // 10MB
            max_response_size: 20 * 1024 * 1024, // 20MB
        }
    }
}

impl RelayConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("RELAY_HOST").unwrap_or(defaults.host),
            port: std::env::var("RELAY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            backend_url: std::env::var("RELAY_BACKEND_URL").unwrap_or(defaults.backend_url),
            mount_prefix: std::env::var("RELAY_MOUNT_PREFIX")
                .map(|s| normalize_prefix(&s))
                .unwrap_or(defaults.mount_prefix),
            upstream_timeout: std::env::var("RELAY_UPSTREAM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            max_body_size: std::env::var("RELAY_MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            max_response_size: std::env::var("RELAY_MAX_RESPONSE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_response_size),
        }
    }
}

/// Normalize a mount prefix to `/segment[/segment...]`, or `""` for the root.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
