//! Configuration module for heroku_watch.
//!
//! This module provides centralized configuration loading from environment variables.
//! Everything here is static for the life of the process; the monitored app,
//! channel and interval seed the [`RuntimeConfig`](crate::monitor::RuntimeConfig)
//! which the dashboard can change later.
//!
//! # Example
//!
//! ```rust,ignore
//! use heroku_watch::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Interval: {}m", config.monitor.check_interval_minutes);
//! ```

mod error;
mod logging;
mod monitor;
mod parse;
mod platform;
mod server;
mod slack;
mod store;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use monitor::MonitorConfig;
pub use platform::PlatformConfig;
pub use server::ServerConfig;
pub use slack::SlackConfig;
pub use store::{StoreBackend, StoreConfig};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Dashboard server configuration.
    pub server: ServerConfig,
    /// Heroku Platform API configuration.
    pub platform: PlatformConfig,
    /// Slack configuration.
    pub slack: SlackConfig,
    /// State store configuration.
    pub store: StoreConfig,
    /// Monitoring defaults.
    pub monitor: MonitorConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            platform: PlatformConfig::from_env()?,
            slack: SlackConfig::from_env()?,
            store: StoreConfig::from_env()?,
            monitor: MonitorConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log. Credentials are never printed.
    pub fn log_summary(&self) {
        use tracing::{info, warn};

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Heroku API: {}", self.platform.base_url);
        info!(
            "  Heroku API key: {}",
            if self.platform.is_configured() { "set" } else { "missing" }
        );
        info!(
            "  Slack token: {}",
            if self.slack.is_configured() { "set" } else { "missing" }
        );

        match &self.store.backend {
            StoreBackend::Sqlite(path) => info!("  State store: sqlite ({})", path.display()),
            StoreBackend::Memory => warn!("  State store: memory (state lost on restart)"),
        }

        if self.monitor.monitored_app.is_empty() {
            info!("  Monitored app: none");
        } else {
            info!("  Monitored app: {}", self.monitor.monitored_app);
        }
        info!("  Slack channel: {}", self.monitor.slack_channel);
        info!("  Check interval: {}m", self.monitor.check_interval_minutes);
        info!("  Config digest: {}", self.monitor.digest_mode);

        if let Some(ref dyno) = self.monitor.dyno {
            info!(
                "  Dyno: {} (scheduler {})",
                dyno,
                if self.monitor.runs_scheduler() { "owner" } else { "disabled" }
            );
        }
    }

    /// Whether both external credentials are present.
    pub fn credentials_present(&self) -> bool {
        self.platform.is_configured() && self.slack.is_configured()
    }
}
