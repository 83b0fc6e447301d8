//! End-to-end health check tests (POST /api/check through to Slack)

use std::time::Duration;

use crate::helpers::*;
use heroku_watch::monitor::RuntimeConfig;
use heroku_watch::state::StateStore;
use heroku_watch::types::{Instance, InstanceStatus};
use reqwest::StatusCode;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_crash_is_alerted_once() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#ops", 5)).await;
    server.platform.set_instances(vec![
        Instance::new("web.1", "web", InstanceStatus::Running),
        Instance::new("worker.1", "worker", InstanceStatus::Running),
    ]);

    // First pass only records a baseline.
    let resp = server.post("/api/check").await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert!(wait_for(|| server.store.len() == 1, WAIT).await);
    assert!(server.slack.messages().is_empty());

    server.platform.set_instances(vec![
        Instance::new("web.1", "web", InstanceStatus::Crashed),
        Instance::new("worker.1", "worker", InstanceStatus::Running),
    ]);

    // A request can land while the previous pass still holds the guard and be
    // skipped, so keep asking until the alert shows up.
    let mut alerted = false;
    for _ in 0..50 {
        server.post("/api/check").await;
        if wait_for(|| !server.slack.messages().is_empty(), Duration::from_millis(100)).await {
            alerted = true;
            break;
        }
    }
    assert!(alerted, "no alert published");

    // Later passes see the crash already recorded.
    server.post("/api/check").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let messages = server.slack.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "#ops");
    assert!(messages[0].1.contains("Dyno Crash Detected"));
    assert!(messages[0].1.contains("web.1 (web)"));

    let state = server.store.load("myapp").await.unwrap().unwrap();
    assert_eq!(state.instance_status["web.1"], InstanceStatus::Crashed);
}

#[tokio::test]
async fn test_alerts_follow_channel_change() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#ops", 5)).await;
    server
        .platform
        .set_instances(vec![Instance::new("web.1", "web", InstanceStatus::Running)]);

    server.post("/api/check").await;
    assert!(wait_for(|| server.store.len() == 1, WAIT).await);

    let resp = server
        .post_form(
            "/update-config",
            &[
                ("app_name", "myapp"),
                ("slack_channel", "#incidents"),
                ("check_interval", "5"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    // Channel-only change keeps the registered job.
    assert_eq!(server.monitor.scheduler().job().unwrap().generation, 1);

    server
        .platform
        .set_instances(vec![Instance::new("web.1", "web", InstanceStatus::Down)]);

    let mut alerted = false;
    for _ in 0..50 {
        server.post("/api/check").await;
        if wait_for(|| !server.slack.messages().is_empty(), Duration::from_millis(100)).await {
            alerted = true;
            break;
        }
    }
    assert!(alerted, "no alert published");

    let messages = server.slack.messages();
    assert_eq!(messages[0].0, "#incidents");
    assert!(messages[0].1.contains("Dynos Down"));
}
