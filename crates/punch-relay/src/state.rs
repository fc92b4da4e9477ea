//! Application state.

use reqwest::Client;
use url::Url;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    /// Parsed backend origin
    pub backend: Url,
    pub http: Client,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let backend = Url::parse(&config.backend_url)
            .map_err(|e| RelayError::Config(format!("{}: {}", config.backend_url, e)))?;
        if !matches!(backend.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "{}: unsupported scheme {}",
                config.backend_url,
                backend.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| RelayError::Config(e.to_string()))?;

        Ok(Self { config, backend, http })
    }
}
