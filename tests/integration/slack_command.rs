//! Slash command tests (POST /slack/command)

use std::time::Duration;

use crate::helpers::*;
use heroku_watch::monitor::RuntimeConfig;
use heroku_watch::notify::{ResponseType, SlashResponse};
use heroku_watch::types::{Instance, InstanceStatus};
use reqwest::StatusCode;

const RESPONSE_URL: &str = "https://hooks.slack.com/commands/T000/1/abc";

async fn slash(server: &TestServer, text: &str) -> SlashResponse {
    let resp = server
        .post_form(
            "/slack/command",
            &[
                ("command", "/heroku-status"),
                ("text", text),
                ("response_url", RESPONSE_URL),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_help_is_ephemeral() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    let reply = slash(&server, "help").await;

    assert_eq!(reply.response_type, ResponseType::Ephemeral);
    assert!(reply.text.contains("/heroku-status [app_name]"));
    assert_eq!(server.platform.calls(), 0);
}

#[tokio::test]
async fn test_unknown_command() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    let resp = server
        .post_form("/slack/command", &[("command", "/deploy"), ("text", "")])
        .await;

    let reply: SlashResponse = resp.json().await.unwrap();
    assert_eq!(reply.response_type, ResponseType::Ephemeral);
    assert_eq!(reply.text, "Unknown command: /deploy");
}

#[tokio::test]
async fn test_status_report_delivered_to_response_url() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    server.platform.set_app_info("shop-api");
    server.platform.set_instances(vec![
        Instance::new("web.1", "web", InstanceStatus::Running),
        Instance::new("web.2", "web", InstanceStatus::Crashed),
    ]);

    let reply = slash(&server, "shop-api").await;
    assert_eq!(reply.response_type, ResponseType::Ephemeral);
    assert_eq!(reply.text, "⏳ Fetching status for `shop-api`...");

    assert!(wait_for(|| server.slack.replies().len() == 1, Duration::from_secs(5)).await);
    let (url, report) = server.slack.replies().remove(0);
    assert_eq!(url, RESPONSE_URL);
    assert_eq!(report.response_type, ResponseType::InChannel);
    assert!(report.text.contains("Heroku App Status: shop-api"));
    assert!(report.text.contains("• web: 2 dynos (1 running, 1 crashed)"));
    assert!(report.text.contains("*Add-ons:* None"));

    // Reports never raise alerts or touch the store.
    assert!(server.slack.messages().is_empty());
    assert!(server.store.is_empty());
}

#[tokio::test]
async fn test_no_app_configured() {
    let server = TestServer::start(RuntimeConfig::new("", "#alerts", 5)).await;
    let reply = slash(&server, "  ").await;

    assert_eq!(reply.response_type, ResponseType::Ephemeral);
    assert_eq!(reply.text, "❌ Specify an app name or configure monitoring");
}
