//! Persisted per-app monitoring state.
//!
//! A [`StateStore`] keeps one [`MonitoredEntityState`] per app name: the last
//! release version seen, the last status of every dyno, and the digest of the
//! last config-vars snapshot. The health check reads it at the start of a pass
//! and writes it back once, after all decisions for the pass are made.
//!
//! | Store | Backend | Notes |
//! |-------|---------|-------|
//! | [`SqliteStateStore`] | SQLite file | Connection opened per call on the blocking pool |
//! | [`MemoryStateStore`] | `HashMap` | State lost on restart |

mod error;
mod memory;
mod sqlite;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::InstanceStatus;

pub use error::StoreError;
pub use memory::MemoryStateStore;
pub use sqlite::SqliteStateStore;

/// Last observed state of one monitored app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitoredEntityState {
    /// App name (primary key).
    pub entity_name: String,
    /// Version of the newest release seen; `None` until the first check.
    pub last_release: Option<String>,
    /// Dyno name -> last observed status.
    pub instance_status: BTreeMap<String, InstanceStatus>,
    /// Hex digest of the last config-vars snapshot; `None` until the first check.
    pub config_hash: Option<String>,
    /// When the state was last persisted.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MonitoredEntityState {
    /// Empty state for an app that has never been checked.
    pub fn baseline(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }
}

/// Key-value persistence for [`MonitoredEntityState`], keyed by app name.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state for `entity`, or `None` when no record exists.
    async fn load(&self, entity: &str) -> Result<Option<MonitoredEntityState>, StoreError>;

    /// Insert or update the state keyed by `state.entity_name`.
    ///
    /// The store stamps `updated_at` with the write time.
    async fn save(&self, state: &MonitoredEntityState) -> Result<(), StoreError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name for status output.
    fn backend(&self) -> &'static str;
}
