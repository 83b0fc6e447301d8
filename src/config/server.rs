//! Dashboard server configuration.

use std::net::SocketAddr;

use super::parse::env_opt;
use super::ConfigError;

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:5000, or 0.0.0.0:$PORT).
    pub listen_addr: SocketAddr,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// LISTEN_ADDR wins over PORT; PORT is what the platform router injects.
    pub fn from_env() -> Result<Self, ConfigError> {
        let (key, raw) = match (env_opt("LISTEN_ADDR"), env_opt("PORT")) {
            (Some(addr), _) => ("LISTEN_ADDR", addr),
            (None, Some(port)) => ("PORT", format!("0.0.0.0:{}", port.trim())),
            (None, None) => ("LISTEN_ADDR", "0.0.0.0:5000".to_string()),
        };

        let listen_addr: SocketAddr = raw.parse().map_err(|e| ConfigError::Parse {
            key: key.into(),
            value: raw.clone(),
            error: format!("{}", e),
        })?;

        Ok(Self { listen_addr })
    }
}
