//! Heroku Platform API configuration.

use std::time::Duration;

use super::parse::{env_duration, env_opt, env_or, env_parse};
use super::ConfigError;

/// Platform API configuration loaded from environment.
#[derive(Clone)]
pub struct PlatformConfig {
    /// API key (HEROKU_API_KEY). Monitoring is inactive without it.
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Number of most recent releases fetched per check.
    pub release_limit: usize,
}

impl PlatformConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout = env_duration("HEROKU_API_TIMEOUT", "30s")?.ok_or_else(|| {
            ConfigError::Invalid {
                key: "HEROKU_API_TIMEOUT".into(),
                message: "timeout cannot be disabled".into(),
            }
        })?;

        let release_limit: usize = env_parse("RELEASE_LIMIT", 3)?;
        if release_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "RELEASE_LIMIT".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(Self {
            api_key: env_opt("HEROKU_API_KEY"),
            base_url: env_or("HEROKU_API_URL", "https://api.heroku.com")
                .trim_end_matches('/')
                .to_string(),
            timeout,
            release_limit,
        })
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("release_limit", &self.release_limit)
            .finish()
    }
}
