use std::time::Duration;

use rustplay_core::config::{env_or, ConfigError};

/// Default backend, the public playground.
pub const DEFAULT_BASE_URL: &str = "https://play.rust-lang.org";

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the playground backend (default: `https://play.rust-lang.org`).
    pub base_url: String,
    /// Transport-level timeout for one HTTP request (default: 60 s).
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                      |
    /// |---------------------------------|------------------------------|
    /// | `PLAYGROUND_URL`                | `https://play.rust-lang.org` |
    /// | `PLAYGROUND_HTTP_TIMEOUT_SECS`  | `60`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("PLAYGROUND_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http_timeout_secs: u64 =
            env_or("PLAYGROUND_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}
