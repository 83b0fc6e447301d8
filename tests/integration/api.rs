//! JSON API tests (/api/status, /health, /metrics)

use crate::helpers::*;
use heroku_watch::monitor::{Credentials, RuntimeConfig};
use reqwest::StatusCode;

#[tokio::test]
async fn test_api_status_fields() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    let resp = server.get("/api/status").await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "heroku_watch");
    assert_eq!(body["monitored_app"], "myapp");
    assert_eq!(body["slack_channel"], "#alerts");
    assert_eq!(body["check_interval"], 5);
    assert_eq!(body["monitoring_active"], true);
    assert_eq!(body["scheduler"], "registered");
    assert_eq!(body["job"]["id"], "health_check");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_api_status_inactive_without_slack_token() {
    let server = TestServer::start_with(
        RuntimeConfig::new("myapp", "#alerts", 5),
        Credentials {
            platform: true,
            notifier: false,
        },
    )
    .await;

    let body: serde_json::Value = server.get("/api/status").await.json().await.unwrap();
    assert_eq!(body["monitoring_active"], false);
    assert_eq!(body["scheduler"], "uninitialized");
    assert!(body["job"].is_null());
}

#[tokio::test]
async fn test_health_reports_credentials_and_store() {
    let server = TestServer::start_with(
        RuntimeConfig::new("myapp", "#alerts", 5),
        Credentials {
            platform: false,
            notifier: true,
        },
    )
    .await;
    let resp = server.get("/health").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["heroku_api_configured"], false);
    assert_eq!(body["slack_configured"], true);
    assert_eq!(body["config"]["monitored_entity"], "myapp");
    assert_eq!(body["config"]["poll_interval_minutes"], 5);
    assert_eq!(body["store"]["reachable"], true);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    let resp = server.get("/metrics").await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "text/plain");
    let body = resp.text().await.unwrap();
    assert!(body.contains("heroku_watch_reconfigurations_total 1"));
}

#[tokio::test]
async fn test_api_check_conflict_when_unconfigured() {
    let server = TestServer::start(RuntimeConfig::new("", "#alerts", 5)).await;
    let resp = server.post("/api/check").await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["accepted"], false);
    assert_eq!(server.platform.calls(), 0);
}
