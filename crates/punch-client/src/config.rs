//! Client configuration.

use std::time::Duration;

/// Configuration for [`crate::ApiClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, normally the relay mount point (e.g. `https://host/api/proxy`)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Max retries for idempotent reads
    pub max_retries: u32,
    /// Bearer token forwarded as `Authorization`
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/proxy".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 2,
            token: None,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("PUNCH_API_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("PUNCH_API_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("PUNCH_API_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            token: std::env::var("PUNCH_API_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Join `path` onto the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/proxy");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_endpoint_joins_single_slash() {
        let config = ClientConfig {
            base_url: "https://kiosk.example.com/api/proxy/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint("/recognize"), "https://kiosk.example.com/api/proxy/recognize");
        assert_eq!(config.endpoint("users/5"), "https://kiosk.example.com/api/proxy/users/5");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig {
            token: Some("secret-token".into()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
