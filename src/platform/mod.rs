//! Snapshot source: read access to the hosting platform.
//!
//! Every [`SnapshotSource`] method answers `Option`: `None` means "no data"
//! (transport failure, timeout, bad status). Implementations log the cause;
//! callers treat `None` as "skip whatever needed this".

mod error;
mod heroku;

use async_trait::async_trait;

use crate::types::{Addon, AppInfo, ConfigVars, FormationEntry, Instance, Release};

pub use error::SourceError;
pub use heroku::HerokuClient;

/// Read-only view of one app on the platform.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Current process instances.
    async fn instances(&self, entity: &str) -> Option<Vec<Instance>>;

    /// Recent releases, newest first, at most the configured limit.
    async fn releases(&self, entity: &str) -> Option<Vec<Release>>;

    /// Configuration variables.
    async fn config_vars(&self, entity: &str) -> Option<ConfigVars>;

    /// Process formation.
    async fn formation(&self, entity: &str) -> Option<Vec<FormationEntry>>;

    /// General app information.
    async fn app_info(&self, entity: &str) -> Option<AppInfo>;

    /// Installed add-ons.
    async fn addons(&self, entity: &str) -> Option<Vec<Addon>>;
}

/// Stand-in used when no API key is configured. Never has data.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSource;

#[async_trait]
impl SnapshotSource for DisabledSource {
    async fn instances(&self, _entity: &str) -> Option<Vec<Instance>> {
        None
    }

    async fn releases(&self, _entity: &str) -> Option<Vec<Release>> {
        None
    }

    async fn config_vars(&self, _entity: &str) -> Option<ConfigVars> {
        None
    }

    async fn formation(&self, _entity: &str) -> Option<Vec<FormationEntry>> {
        None
    }

    async fn app_info(&self, _entity: &str) -> Option<AppInfo> {
        None
    }

    async fn addons(&self, _entity: &str) -> Option<Vec<Addon>> {
        None
    }
}
