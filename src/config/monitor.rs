//! Monitoring defaults and scheduler placement.

use super::parse::{env_opt, env_or, env_parse};
use super::ConfigError;
use crate::health::DigestMode;
use crate::monitor::{MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};

/// Initial runtime configuration and monitor settings loaded from environment.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// App monitored at startup (may be empty).
    pub monitored_app: String,
    /// Slack channel alerts go to at startup.
    pub slack_channel: String,
    /// Poll interval at startup, minutes.
    pub check_interval_minutes: u32,
    /// What the config-vars digest covers.
    pub digest_mode: DigestMode,
    /// Dyno name this process runs as (DYNO), if any.
    pub dyno: Option<String>,
    /// Workers serving slash-command status requests.
    pub status_workers: usize,
    /// Pending status requests allowed before new ones are refused.
    pub status_queue_capacity: usize,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let check_interval_minutes: u32 = env_parse("CHECK_INTERVAL_MINUTES", 5)?;
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&check_interval_minutes) {
            return Err(ConfigError::Invalid {
                key: "CHECK_INTERVAL_MINUTES".into(),
                message: format!(
                    "{} is outside {}-{}",
                    check_interval_minutes, MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES
                ),
            });
        }

        let digest_raw = env_or("CONFIG_DIGEST_MODE", "values");
        let digest_mode = digest_raw
            .parse::<DigestMode>()
            .map_err(|message| ConfigError::Invalid {
                key: "CONFIG_DIGEST_MODE".into(),
                message,
            })?;

        let status_workers: usize = env_parse("STATUS_WORKERS", 2)?;
        let status_queue_capacity: usize = env_parse("STATUS_QUEUE_CAPACITY", 32)?;
        if status_workers == 0 || status_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "STATUS_WORKERS".into(),
                message: "status workers and queue capacity must be at least 1".into(),
            });
        }

        Ok(Self {
            monitored_app: env_or("MONITORED_APP_NAME", "").trim().to_string(),
            slack_channel: env_or("SLACK_CHANNEL", "#alerts").trim().to_string(),
            check_interval_minutes,
            digest_mode,
            dyno: env_opt("DYNO"),
            status_workers,
            status_queue_capacity,
        })
    }

    /// Whether this process should own the scheduler.
    ///
    /// Only web.1 schedules on a multi-dyno deployment; outside the platform
    /// (no DYNO) the single process always does.
    pub fn runs_scheduler(&self) -> bool {
        scheduler_role_allowed(self.dyno.as_deref())
    }
}

fn scheduler_role_allowed(dyno: Option<&str>) -> bool {
    match dyno {
        None => true,
        Some(name) => name == "web.1",
    }
}
