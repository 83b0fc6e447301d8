//! In-memory state store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::{MonitoredEntityState, StateStore, StoreError};

/// Process-local [`StateStore`]. Used when DATABASE_PATH is `:memory:`.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<String, MonitoredEntityState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of apps with stored state.
    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, entity: &str) -> Result<Option<MonitoredEntityState>, StoreError> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        Ok(states.get(entity).cloned())
    }

    async fn save(&self, state: &MonitoredEntityState) -> Result<(), StoreError> {
        let mut stored = state.clone();
        stored.updated_at = Some(Utc::now());

        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        states.insert(stored.entity_name.clone(), stored);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
