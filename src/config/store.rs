//! State store configuration.

use std::path::PathBuf;

use super::parse::env_or;
use super::ConfigError;

/// Which state store backend to use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite database file.
    Sqlite(PathBuf),
    /// Process-local map; state is lost on restart.
    Memory,
}

/// Store configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// DATABASE_PATH=:memory: selects the in-memory store.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env_or("DATABASE_PATH", "heroku_watch.db");
        let path = path.trim();

        let backend = match path {
            "" => {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_PATH".into(),
                    message: "path cannot be empty".into(),
                })
            }
            ":memory:" => StoreBackend::Memory,
            p => StoreBackend::Sqlite(PathBuf::from(p)),
        };

        Ok(Self { backend })
    }
}
