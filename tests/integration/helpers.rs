//! Test helpers and utilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, Response};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use heroku_watch::health::{DigestMode, HealthCheckOrchestrator};
use heroku_watch::monitor::{Credentials, Monitor, RuntimeConfig, RuntimeConfigHandle};
use heroku_watch::notify::{Notifier, ResponseSink, SlashResponse};
use heroku_watch::observability::Metrics;
use heroku_watch::platform::SnapshotSource;
use heroku_watch::scheduler::Scheduler;
use heroku_watch::server::{self, AppState};
use heroku_watch::state::{MemoryStateStore, StateStore};
use heroku_watch::status::{StatusPool, StatusReporter};
use heroku_watch::types::{Addon, AppInfo, ConfigVars, FormationEntry, Instance, Release};

// =============================================================================
// Fakes
// =============================================================================

/// Platform stand-in with settable answers.
#[derive(Default)]
pub struct FakePlatform {
    pub instances: Mutex<Option<Vec<Instance>>>,
    pub releases: Mutex<Option<Vec<Release>>>,
    pub config: Mutex<Option<ConfigVars>>,
    pub app_info: Mutex<Option<AppInfo>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakePlatform {
    pub fn set_instances(&self, instances: Vec<Instance>) {
        *self.instances.lock().unwrap() = Some(instances);
    }

    pub fn set_app_info(&self, name: &str) {
        *self.app_info.lock().unwrap() = Some(AppInfo {
            name: name.to_string(),
            owner_email: Some("owner@example.com".into()),
            region: Some("eu".into()),
            stack: Some("heroku-24".into()),
            web_url: None,
        });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotSource for FakePlatform {
    async fn instances(&self, _entity: &str) -> Option<Vec<Instance>> {
        self.hit();
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
        None
    }

    async fn app_info(&self, _entity: &str) -> Option<AppInfo> {
        self.hit();
        self.app_info.lock().unwrap().clone()
    }

    async fn addons(&self, _entity: &str) -> Option<Vec<Addon>> {
        self.hit();
        Some(Vec::new())
    }
}

/// Records channel posts and slash-command replies.
#[derive(Default)]
pub struct RecordingSlack {
    messages: Mutex<Vec<(String, String)>>,
    replies: Mutex<Vec<(String, SlashResponse)>>,
}

#[allow(dead_code)]
impl RecordingSlack {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<(String, SlashResponse)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingSlack {
    async fn publish(&self, text: &str, channel: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
    }
}

#[async_trait]
impl ResponseSink for RecordingSlack {
    async fn respond(&self, response_url: &str, response: &SlashResponse) {
        self.replies
            .lock()
            .unwrap()
            .push((response_url.to_string(), response.clone()));
    }
}

// =============================================================================
// Test server
// =============================================================================

/// The full stack on an ephemeral port, wired to fakes.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub platform: Arc<FakePlatform>,
    pub slack: Arc<RecordingSlack>,
    pub store: Arc<MemoryStateStore>,
    pub monitor: Arc<Monitor>,
    shutdown: Option<oneshot::Sender<()>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start with both credentials present.
    pub async fn start(initial: RuntimeConfig) -> Self {
        Self::start_with(
            initial,
            Credentials {
                platform: true,
                notifier: true,
            },
        )
        .await
    }

    pub async fn start_with(initial: RuntimeConfig, credentials: Credentials) -> Self {
        let platform = Arc::new(FakePlatform::default());
        let slack = Arc::new(RecordingSlack::default());
        let store = Arc::new(MemoryStateStore::new());
        let metrics = Arc::new(Metrics::new().expect("metrics"));
        let runtime = RuntimeConfigHandle::new(initial);

        let orchestrator = Arc::new(HealthCheckOrchestrator::new(
            platform.clone(),
            slack.clone(),
            store.clone(),
            runtime.clone(),
            DigestMode::Values,
            metrics.clone(),
        ));
        let scheduler = Arc::new(Scheduler::new(orchestrator, metrics.clone()));
        let monitor = Arc::new(Monitor::new(
            runtime,
            scheduler,
            StatusReporter::new(platform.clone()),
            credentials,
            true,
        ));
        let pool = Arc::new(StatusPool::new(2, 8, monitor.clone(), slack.clone()));
        let state_store: Arc<dyn StateStore> = store.clone();
        let state = Arc::new(AppState::new(
            monitor.clone(),
            pool,
            state_store,
            metrics,
            "heroku_watch",
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = server::serve(listener, state, async {
                let _ = rx.await;
            })
            .await;
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            platform,
            slack,
            store,
            monitor,
            shutdown: Some(tx),
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a POST request with form data
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Make an empty POST request
    pub async fn post(&self, path: &str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("POST request failed")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Poll `condition` every 20ms until it holds or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_for<F: FnMut() -> bool>(mut condition: F, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

// =============================================================================
// Assertions
// =============================================================================

/// Assert that response contains header
#[allow(dead_code)]
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}

/// Assert that response contains header with prefix
#[allow(dead_code)]
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Assert that response body contains substring
#[allow(dead_code)]
pub async fn assert_body_contains(response: Response, substring: &str) {
    let body = response.text().await.expect("Failed to read body");
    assert!(
        body.contains(substring),
        "Body does not contain '{}'. Body: {}",
        substring,
        &body[..body.len().min(500)]
    );
}
