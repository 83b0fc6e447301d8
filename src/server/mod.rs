//! Dashboard, JSON API and Slack slash-command endpoint.
//!
//! | Route                 | Purpose                                   |
//! |-----------------------|-------------------------------------------|
//! | `GET /`               | HTML dashboard                            |
//! | `POST /update-config` | change app / channel / interval           |
//! | `GET /api/status`     | runtime configuration and scheduler state |
//! | `GET /health`         | credentials, config, store reachability   |
//! | `POST /api/check`     | run a check now                           |
//! | `POST /slack/command` | `/heroku-status [app\|help]`              |
//! | `GET /metrics`        | Prometheus text                           |

mod dashboard;
mod form;

use std::convert::Infallible;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use http::header::{CONTENT_TYPE, LOCATION};
use http::HeaderValue;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;

use crate::monitor::{Monitor, RuntimeConfig, ValidationError};
use crate::notify::SlashResponse;
use crate::observability::Metrics;
use crate::scheduler::{JobInfo, JobRun};
use crate::state::StateStore;
use crate::status::{PoolError, StatusPool, StatusRequest};

pub use dashboard::{escape_html, Banner};
pub use form::{encode_query_value, field, parse_form, FormFields};

/// The only slash command this bot answers.
pub const SLASH_COMMAND: &str = "/heroku-status";

/// Largest form body accepted.
const MAX_FORM_BYTES: usize = 64 * 1024;

const HELP_TEXT: &str = "🤠 *Heroku Monitoring Bot Help* 🤠\n\n\
    • `/heroku-status [app_name]` - Get current status of a monitored Heroku app\n\
    • Configure monitoring via the web dashboard at `/`\n\
    • Alerts are sent to Slack when dynos crash, releases deploy, or config vars change\n\
    • Check interval can be adjusted in the dashboard (1-60 min)\n";

type HttpResponse = Response<Full<Bytes>>;

/// Shared state for request handlers.
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub pool: Arc<StatusPool>,
    pub store: Arc<dyn StateStore>,
    pub metrics: Arc<Metrics>,
    pub service_name: String,
    initialized: AtomicBool,
}

impl AppState {
    pub fn new(
        monitor: Arc<Monitor>,
        pool: Arc<StatusPool>,
        store: Arc<dyn StateStore>,
        metrics: Arc<Metrics>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            monitor,
            pool,
            store,
            metrics,
            service_name: service_name.into(),
            initialized: AtomicBool::new(false),
        }
    }
}

/// Accept connections until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()>,
{
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "dashboard listening");
    tokio::pin!(shutdown);

    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            },
            _ = &mut shutdown => break,
        };
        let _ = stream.set_nodelay(true);
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handle_request(req, state).await }
            });

            let io = TokioIo::new(stream);
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });
    }

    tracing::info!("dashboard stopped");
    Ok(())
}

/// Route one request.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if !state.initialized.swap(true, Ordering::SeqCst) {
        state.monitor.auto_init().await;
    }

    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") => index(&req, &state),
        (&Method::POST, "/update-config") => update_config(req, &state).await,
        (&Method::GET, "/api/status") => api_status(&state),
        (&Method::GET, "/health") => health(&state).await,
        (&Method::POST, "/api/check") => api_check(&state),
        (&Method::POST, "/slack/command") => slack_command(req, &state).await,
        (&Method::GET, "/metrics") => text(
            StatusCode::OK,
            "text/plain; version=0.0.4",
            state.metrics.export(),
        ),
        _ => text(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string()),
    };

    tracing::debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response)
}

fn index<B>(req: &Request<B>, state: &AppState) -> HttpResponse {
    let query = parse_form(req.uri().query().unwrap_or(""));
    let banner = match (field(&query, "success"), field(&query, "error")) {
        (_, Some(message)) => Banner::Error(message.to_string()),
        (Some("true"), None) => Banner::Success,
        _ => Banner::None,
    };

    let monitor = &state.monitor;
    let config = monitor.runtime().snapshot();
    let html = dashboard::render(&dashboard::DashboardView {
        service: &state.service_name,
        version: crate::VERSION,
        config: &config,
        monitoring_active: config.has_entity() && monitor.credentials().complete(),
        credentials: monitor.credentials(),
        scheduler: monitor.scheduler().state(),
        job: monitor.scheduler().job(),
        banner,
    });

    text(StatusCode::OK, "text/html; charset=utf-8", html)
}

async fn update_config<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let fields = match read_form(req).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let app_name = field(&fields, "app_name").unwrap_or("").trim();
    let channel = field(&fields, "slack_channel").unwrap_or("").trim();
    let interval = field(&fields, "check_interval").unwrap_or("").trim();

    if app_name.is_empty() || channel.is_empty() || interval.is_empty() {
        return redirect(&format!(
            "/?error={}",
            encode_query_value("All fields are required")
        ));
    }

    let result = match interval.parse::<u32>() {
        Ok(minutes) => state.monitor.reconfigure(app_name, channel, minutes).await,
        Err(_) => Err(ValidationError::InvalidInterval(interval.to_string())),
    };

    match result {
        Ok(_) => redirect("/?success=true"),
        Err(e) => {
            tracing::warn!(error = %e, "configuration update rejected");
            redirect(&format!("/?error={}", encode_query_value(&e.to_string())))
        }
    }
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: &'static str,
    service: &'a str,
    version: &'static str,
    monitored_app: &'a str,
    slack_channel: &'a str,
    check_interval: u32,
    monitoring_active: bool,
    scheduler: &'static str,
    job: Option<JobInfo>,
    timestamp: String,
}

fn api_status(state: &AppState) -> HttpResponse {
    let monitor = &state.monitor;
    let config = monitor.runtime().snapshot();

    json(
        StatusCode::OK,
        &StatusBody {
            status: "ok",
            service: &state.service_name,
            version: crate::VERSION,
            monitored_app: &config.monitored_entity,
            slack_channel: &config.notification_channel,
            check_interval: config.poll_interval_minutes,
            monitoring_active: config.has_entity() && monitor.credentials().complete(),
            scheduler: monitor.scheduler().state().as_str(),
            job: monitor.scheduler().job(),
            timestamp: Utc::now().to_rfc3339(),
        },
    )
}

#[derive(Serialize)]
struct StoreHealth {
    backend: &'static str,
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthBody<'a> {
    status: &'static str,
    heroku_api_configured: bool,
    slack_configured: bool,
    config: &'a RuntimeConfig,
    store: StoreHealth,
    timestamp: String,
}

async fn health(state: &AppState) -> HttpResponse {
    let credentials = state.monitor.credentials();
    let config = state.monitor.runtime().snapshot();

    let ping = state.store.ping().await;
    let store = StoreHealth {
        backend: state.store.backend(),
        reachable: ping.is_ok(),
        error: ping.err().map(|e| e.to_string()),
    };
    let (status_code, status) = if store.reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    json(
        status_code,
        &HealthBody {
            status,
            heroku_api_configured: credentials.platform,
            slack_configured: credentials.notifier,
            config: &config,
            store,
            timestamp: Utc::now().to_rfc3339(),
        },
    )
}

#[derive(Serialize)]
struct CheckAccepted<'a> {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    app: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn api_check(state: &AppState) -> HttpResponse {
    let config = state.monitor.runtime().snapshot();
    if !(config.has_entity() && state.monitor.credentials().complete()) {
        return json(
            StatusCode::CONFLICT,
            &CheckAccepted {
                accepted: false,
                app: None,
                error: Some("Monitoring is not configured"),
            },
        );
    }

    let monitor = Arc::clone(&state.monitor);
    let entity = config.monitored_entity.clone();
    tokio::spawn(async move {
        match monitor.run_check(&entity).await {
            JobRun::Completed(report) => tracing::info!(
                app = %report.entity,
                alerts = report.events.len(),
                aborted = report.aborted,
                "manual check finished"
            ),
            JobRun::Skipped => {
                tracing::info!(app = %entity, "manual check skipped, a check is already running")
            }
        }
    });

    json(
        StatusCode::ACCEPTED,
        &CheckAccepted {
            accepted: true,
            app: Some(&config.monitored_entity),
            error: None,
        },
    )
}

async fn slack_command<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let fields = match read_form(req).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let command = field(&fields, "command").unwrap_or("");
    let text_arg = field(&fields, "text").unwrap_or("").trim();

    let reply = if command != SLASH_COMMAND {
        SlashResponse::ephemeral(format!("Unknown command: {}", command))
    } else if text_arg.eq_ignore_ascii_case("help") {
        SlashResponse::ephemeral(HELP_TEXT)
    } else {
        let entity = if text_arg.is_empty() {
            state.monitor.runtime().snapshot().monitored_entity.clone()
        } else {
            text_arg.to_string()
        };

        match field(&fields, "response_url") {
            _ if entity.is_empty() => {
                SlashResponse::ephemeral("❌ Specify an app name or configure monitoring")
            }
            None | Some("") => SlashResponse::ephemeral("❌ Missing response_url"),
            Some(response_url) => {
                let request = StatusRequest {
                    entity: entity.clone(),
                    response_url: response_url.to_string(),
                };
                match state.pool.submit(request) {
                    Ok(()) => {
                        SlashResponse::ephemeral(format!("⏳ Fetching status for `{}`...", entity))
                    }
                    Err(e @ PoolError::QueueFull { .. }) => {
                        tracing::warn!(app = %entity, error = %e, "status request dropped");
                        SlashResponse::ephemeral(
                            "⏳ Too many status requests right now, try again in a moment",
                        )
                    }
                    Err(PoolError::Shutdown) => {
                        SlashResponse::ephemeral("❌ Service is shutting down")
                    }
                }
            }
        }
    };

    json(StatusCode::OK, &reply)
}

async fn read_form<B>(req: Request<B>) -> Result<FormFields, HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(req.into_body(), MAX_FORM_BYTES).collect().await {
        Ok(collected) => {
            let body = collected.to_bytes();
            Ok(parse_form(&String::from_utf8_lossy(&body)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            Err(text(
                StatusCode::BAD_REQUEST,
                "text/plain",
                "Bad Request".to_string(),
            ))
        }
    }
}

fn text(status: StatusCode, content_type: &'static str, body: String) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    match serde_json::to_string(value) {
        Ok(body) => text(status, "application/json", body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            text(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain",
                "Internal Server Error".to_string(),
            )
        }
    }
}

fn redirect(location: &str) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::SEE_OTHER;
    let value = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    response.headers_mut().insert(LOCATION, value);
    response
}
