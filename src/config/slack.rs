//! Slack Web API configuration.

use std::time::Duration;

use super::parse::{env_duration, env_opt, env_or};
use super::ConfigError;

/// Slack configuration loaded from environment.
#[derive(Clone)]
pub struct SlackConfig {
    /// Bot token (SLACK_BOT_TOKEN). Monitoring is inactive without it.
    pub bot_token: Option<String>,
    /// Web API base URL.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SlackConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout =
            env_duration("SLACK_TIMEOUT", "10s")?.ok_or_else(|| ConfigError::Invalid {
                key: "SLACK_TIMEOUT".into(),
                message: "timeout cannot be disabled".into(),
            })?;

        Ok(Self {
            bot_token: env_opt("SLACK_BOT_TOKEN"),
            api_url: env_or("SLACK_API_URL", "https://slack.com/api")
                .trim_end_matches('/')
                .to_string(),
            timeout,
        })
    }

    /// Whether a bot token is present.
    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some()
    }
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
