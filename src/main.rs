use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use heroku_watch::config::{Config, StoreBackend};
use heroku_watch::health::HealthCheckOrchestrator;
use heroku_watch::monitor::{Credentials, Monitor, RuntimeConfig, RuntimeConfigHandle};
use heroku_watch::notify::{DisabledNotifier, Notifier, ResponseSink, SlackClient};
use heroku_watch::observability::Metrics;
use heroku_watch::platform::{DisabledSource, HerokuClient, SnapshotSource};
use heroku_watch::scheduler::Scheduler;
use heroku_watch::server::{self, AppState};
use heroku_watch::state::{MemoryStateStore, SqliteStateStore, StateStore};
use heroku_watch::status::{StatusPool, StatusReporter};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    heroku_watch::logging::init(&config.logging)?;

    info!("Starting heroku_watch {}", heroku_watch::VERSION);
    config.log_summary();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let source: Arc<dyn SnapshotSource> = match HerokuClient::from_config(&config.platform)? {
        Some(client) => Arc::new(client),
        None => {
            warn!("HEROKU_API_KEY not set, platform data unavailable");
            Arc::new(DisabledSource)
        }
    };

    let (notifier, sink): (Arc<dyn Notifier>, Arc<dyn ResponseSink>) =
        match SlackClient::from_config(&config.slack)? {
            Some(client) => {
                let client = Arc::new(client);
                let notifier: Arc<dyn Notifier> = client.clone();
                let sink: Arc<dyn ResponseSink> = client;
                (notifier, sink)
            }
            None => {
                warn!("SLACK_BOT_TOKEN not set, messages will be dropped");
                let disabled = Arc::new(DisabledNotifier);
                let notifier: Arc<dyn Notifier> = disabled.clone();
                let sink: Arc<dyn ResponseSink> = disabled;
                (notifier, sink)
            }
        };

    let store: Arc<dyn StateStore> = match &config.store.backend {
        StoreBackend::Sqlite(path) => Arc::new(SqliteStateStore::open(path)?),
        StoreBackend::Memory => Arc::new(MemoryStateStore::new()),
    };

    let metrics = Arc::new(Metrics::new()?);

    let runtime_config = RuntimeConfigHandle::new(RuntimeConfig::new(
        config.monitor.monitored_app.clone(),
        config.monitor.slack_channel.clone(),
        config.monitor.check_interval_minutes,
    ));

    let orchestrator = Arc::new(HealthCheckOrchestrator::new(
        Arc::clone(&source),
        notifier,
        Arc::clone(&store),
        runtime_config.clone(),
        config.monitor.digest_mode,
        Arc::clone(&metrics),
    ));
    let scheduler = Arc::new(Scheduler::new(orchestrator, Arc::clone(&metrics)));

    let credentials = Credentials {
        platform: config.platform.is_configured(),
        notifier: config.slack.is_configured(),
    };
    let monitor = Arc::new(Monitor::new(
        runtime_config,
        Arc::clone(&scheduler),
        StatusReporter::new(source),
        credentials,
        config.monitor.runs_scheduler(),
    ));

    let pool = Arc::new(StatusPool::new(
        config.monitor.status_workers,
        config.monitor.status_queue_capacity,
        monitor.clone(),
        sink,
    ));

    monitor.auto_init().await;
    if !monitor.is_monitoring_active() {
        warn!("Monitoring inactive: set an app on the dashboard and both credentials");
    }

    let state = Arc::new(AppState::new(
        Arc::clone(&monitor),
        Arc::clone(&pool),
        store,
        metrics,
        config.logging.service_name.clone(),
    ));

    let listener = TcpListener::bind(config.server.listen_addr).await?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        info!("Shutting down...");
    };

    if let Err(e) = server::serve(listener, state, shutdown).await {
        tracing::error!(error = %e, "server error");
    }

    // Cleanup
    scheduler.shutdown().await;
    pool.shutdown().await;

    Ok(())
}
