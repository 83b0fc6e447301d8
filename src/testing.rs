//! Fake collaborators for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::health::{CheckReport, HealthCheck};
use crate::notify::{Notifier, ResponseSink, SlashResponse};
use crate::platform::SnapshotSource;
use crate::state::{MemoryStateStore, MonitoredEntityState, StateStore, StoreError};
use crate::types::{Addon, AppInfo, ConfigVars, FormationEntry, Instance, Release};

/// Scripted [`SnapshotSource`]. Each part answers whatever was last set.
#[derive(Default)]
pub struct FakeSource {
    pub instances: Mutex<Option<Vec<Instance>>>,
    pub releases: Mutex<Option<Vec<Release>>>,
    pub config: Mutex<Option<ConfigVars>>,
    pub formation: Mutex<Option<Vec<FormationEntry>>>,
    pub app_info: Mutex<Option<AppInfo>>,
    pub addons: Mutex<Option<Vec<Addon>>>,
    /// Applied to every instances fetch, to hold a pass open.
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_instances(&self, instances: Option<Vec<Instance>>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub fn set_releases(&self, releases: Option<Vec<Release>>) {
        *self.releases.lock().unwrap() = releases;
    }

    pub fn set_config(&self, config: Option<ConfigVars>) {
        *self.config.lock().unwrap() = config;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn instances(&self, _entity: &str) -> Option<Vec<Instance>> {
        self.hit();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.instances.lock().unwrap().clone()
    }

    async fn releases(&self, _entity: &str) -> Option<Vec<Release>> {
        self.hit();
        self.releases.lock().unwrap().clone()
    }

    async fn config_vars(&self, _entity: &str) -> Option<ConfigVars> {
        self.hit();
        self.config.lock().unwrap().clone()
    }

    async fn formation(&self, _entity: &str) -> Option<Vec<FormationEntry>> {
        self.hit();
        self.formation.lock().unwrap().clone()
    }

    async fn app_info(&self, _entity: &str) -> Option<AppInfo> {
        self.hit();
        self.app_info.lock().unwrap().clone()
    }

    async fn addons(&self, _entity: &str) -> Option<Vec<Addon>> {
        self.hit();
        self.addons.lock().unwrap().clone()
    }
}

/// Records every message and reply instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    /// `(channel, text)` in publish order.
    pub messages: Mutex<Vec<(String, String)>>,
    /// `(response_url, reply)` in delivery order.
    pub replies: Mutex<Vec<(String, SlashResponse)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<(String, SlashResponse)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, text: &str, channel: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
    }
}

#[async_trait]
impl ResponseSink for RecordingNotifier {
    async fn respond(&self, response_url: &str, response: &SlashResponse) {
        self.replies
            .lock()
            .unwrap()
            .push((response_url.to_string(), response.clone()));
    }
}

/// [`MemoryStateStore`] with switchable failures and a save counter.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStateStore,
    pub fail_load: AtomicBool,
    pub fail_save: AtomicBool,
    pub saves: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn load(&self, entity: &str) -> Result<Option<MonitoredEntityState>, StoreError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("load disabled".into()));
        }
        self.inner.load(entity).await
    }

    async fn save(&self, state: &MonitoredEntityState) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save disabled".into()));
        }
        self.inner.save(state).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ping disabled".into()));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "flaky"
    }
}

/// [`HealthCheck`] that counts runs and optionally sleeps to simulate a slow
/// pass.
#[derive(Default)]
pub struct CountingCheck {
    pub delay: Option<Duration>,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
    pub running: AtomicUsize,
    pub max_running: AtomicUsize,
    pub entities: Mutex<Vec<String>>,
}

impl CountingCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    pub fn entities(&self) -> Vec<String> {
        self.entities.lock().unwrap().clone()
    }
}

#[async_trait]
impl HealthCheck for CountingCheck {
    async fn run_check(&self, entity: &str) -> CheckReport {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        self.entities.lock().unwrap().push(entity.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
        CheckReport::completed(entity, Vec::new(), true)
    }
}
