//! SQLite-backed state store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{MonitoredEntityState, StateStore, StoreError};
use crate::types::InstanceStatus;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS app_state (
    app_name         TEXT PRIMARY KEY,
    last_release     TEXT,
    dynos            TEXT NOT NULL DEFAULT '{}',
    config_vars_hash TEXT,
    updated_at       TEXT
);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// [`StateStore`] persisting to a SQLite file.
///
/// No connection is kept: each call opens one on the blocking pool and drops
/// it when the call returns.
#[derive(Debug, Clone)]
pub struct SqliteStateStore {
    path: PathBuf,
}

impl SqliteStateStore {
    /// Open (and create if needed) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };
        let conn = store.connect()?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(path = %store.path.display(), "state store ready");
        Ok(store)
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn load_blocking(&self, entity: &str) -> Result<Option<MonitoredEntityState>, StoreError> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT last_release, dynos, config_vars_hash, updated_at
                 FROM app_state WHERE app_name = ?1",
                params![entity],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((last_release, dynos, config_hash, updated_at)) = row else {
            return Ok(None);
        };

        let instance_status = match dynos.as_deref() {
            None | Some("") => BTreeMap::new(),
            Some(json) => serde_json::from_str::<BTreeMap<String, InstanceStatus>>(json)
                .map_err(|e| StoreError::Decode {
                    entity: entity.to_string(),
                    error: e.to_string(),
                })?,
        };

        Ok(Some(MonitoredEntityState {
            entity_name: entity.to_string(),
            last_release: last_release.filter(|r| !r.is_empty()),
            instance_status,
            config_hash: config_hash.filter(|h| !h.is_empty()),
            updated_at: updated_at.as_deref().and_then(parse_timestamp),
        }))
    }

    fn save_blocking(&self, state: &MonitoredEntityState) -> Result<(), StoreError> {
        let dynos = serde_json::to_string(&state.instance_status)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO app_state (app_name, last_release, dynos, config_vars_hash, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(app_name) DO UPDATE SET
                 last_release = excluded.last_release,
                 dynos = excluded.dynos,
                 config_vars_hash = excluded.config_vars_hash,
                 updated_at = excluded.updated_at",
            params![
                state.entity_name,
                state.last_release,
                dynos,
                state.config_hash,
                now
            ],
        )?;
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self, entity: &str) -> Result<Option<MonitoredEntityState>, StoreError> {
        let store = self.clone();
        let entity = entity.to_string();
        tokio::task::spawn_blocking(move || store.load_blocking(&entity)).await?
    }

    async fn save(&self, state: &MonitoredEntityState) -> Result<(), StoreError> {
        let store = self.clone();
        let owned = state.clone();
        tokio::task::spawn_blocking(move || store.save_blocking(&owned)).await??;
        tracing::debug!(app = %state.entity_name, "state committed");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = store.connect()?;
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await?
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
