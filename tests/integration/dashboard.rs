//! Dashboard tests (GET /, POST /update-config)

use crate::helpers::*;
use heroku_watch::monitor::RuntimeConfig;
use reqwest::StatusCode;

#[tokio::test]
async fn test_dashboard_renders_current_config() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    let resp = server.get("/").await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "text/html");
    let body = resp.text().await.unwrap();
    assert!(body.contains("<code>myapp</code>"));
    assert!(body.contains(r#"name="check_interval""#));
    assert!(body.contains(r#"<span class="ok">active</span>"#));
}

#[tokio::test]
async fn test_update_config_redirects_on_success() {
    let server = TestServer::start(RuntimeConfig::new("", "#alerts", 5)).await;
    let resp = server
        .post_form(
            "/update-config",
            &[
                ("app_name", "  shop-api "),
                ("slack_channel", "#deploys"),
                ("check_interval", "15"),
            ],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_header(&resp, "location", "/?success=true");

    let config = server.monitor.runtime().snapshot();
    assert_eq!(config.monitored_entity, "shop-api");
    assert_eq!(config.notification_channel, "#deploys");
    assert_eq!(config.poll_interval_minutes, 15);

    let job = server.monitor.scheduler().job().unwrap();
    assert_eq!(job.entity, "shop-api");
    assert_eq!(job.interval_minutes, 15);

    assert_body_contains(server.get("/?success=true").await, "Configuration updated.").await;
}

#[tokio::test]
async fn test_update_config_rejects_out_of_range_interval() {
    let server = TestServer::start(RuntimeConfig::new("myapp", "#alerts", 5)).await;
    // Registers the job through auto-init.
    server.get("/").await;

    let resp = server
        .post_form(
            "/update-config",
            &[
                ("app_name", "other"),
                ("slack_channel", "#alerts"),
                ("check_interval", "120"),
            ],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("/?error="), "got {}", location);

    let config = server.monitor.runtime().snapshot();
    assert_eq!(config.monitored_entity, "myapp");
    assert_eq!(config.poll_interval_minutes, 5);
    assert_eq!(server.monitor.scheduler().job().unwrap().entity, "myapp");

    let page = server.get(&location).await.text().await.unwrap();
    assert!(page.contains("Check interval must be between 1 and 60 minutes"));
}

#[tokio::test]
async fn test_update_config_requires_all_fields() {
    let server = TestServer::start(RuntimeConfig::new("", "#alerts", 5)).await;
    let resp = server
        .post_form(
            "/update-config",
            &[("app_name", "myapp"), ("slack_channel", ""), ("check_interval", "5")],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_header(&resp, "location", "/?error=All%20fields%20are%20required");
    assert!(server.monitor.scheduler().job().is_none());
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = TestServer::start(RuntimeConfig::new("", "#alerts", 5)).await;
    assert_eq!(server.get("/test-db").await.status(), StatusCode::NOT_FOUND);
}
