//! One health check pass: load, fetch, evaluate, notify, persist.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;

use super::alert::AlertKind;
use super::digest::DigestMode;
use super::evaluator::{evaluate, Evaluation, Snapshot};
use super::HealthCheck;
use crate::logging::ALERT_TARGET;
use crate::monitor::RuntimeConfigHandle;
use crate::notify::Notifier;
use crate::observability::Metrics;
use crate::platform::SnapshotSource;
use crate::state::{MonitoredEntityState, StateStore};

/// Outcome of a pass, for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub entity: String,
    /// Alerts published, in order.
    pub events: Vec<AlertKind>,
    /// Whether the next state was written.
    pub persisted: bool,
    /// Every fetch failed; nothing was evaluated or written.
    pub aborted: bool,
}

impl CheckReport {
    pub fn completed(entity: &str, events: Vec<AlertKind>, persisted: bool) -> Self {
        Self {
            entity: entity.to_string(),
            events,
            persisted,
            aborted: false,
        }
    }

    pub fn aborted(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            events: Vec::new(),
            persisted: false,
            aborted: true,
        }
    }
}

/// Runs health check passes against the configured collaborators.
///
/// Never returns an error: collaborator failures are logged, counted and
/// absorbed according to which step failed.
pub struct HealthCheckOrchestrator {
    source: Arc<dyn SnapshotSource>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn StateStore>,
    runtime: RuntimeConfigHandle,
    digest_mode: DigestMode,
    metrics: Arc<Metrics>,
}

impl HealthCheckOrchestrator {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn StateStore>,
        runtime: RuntimeConfigHandle,
        digest_mode: DigestMode,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            runtime,
            digest_mode,
            metrics,
        }
    }

    async fn load_prior(&self, entity: &str) -> MonitoredEntityState {
        match self.store.load(entity).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::info!(app = %entity, "no stored state, starting from baseline");
                MonitoredEntityState::baseline(entity)
            }
            Err(e) => {
                // Alerts that depend on prior state are suppressed this pass.
                tracing::error!(app = %entity, error = %e, "failed to load state, using baseline");
                self.metrics.record_store_failure("load");
                MonitoredEntityState::baseline(entity)
            }
        }
    }

    async fn fetch_snapshot(&self, entity: &str) -> Snapshot {
        let (instances, releases, config) = tokio::join!(
            self.source.instances(entity),
            self.source.releases(entity),
            self.source.config_vars(entity),
        );

        for (operation, missing) in [
            ("instances", instances.is_none()),
            ("releases", releases.is_none()),
            ("config_vars", config.is_none()),
        ] {
            if missing {
                self.metrics.record_source_failure(operation);
            }
        }

        Snapshot {
            instances,
            releases,
            config,
        }
    }

    async fn pass(&self, entity: &str) -> CheckReport {
        let prior = self.load_prior(entity).await;
        let snapshot = self.fetch_snapshot(entity).await;

        if snapshot.is_unavailable() {
            tracing::warn!(app = %entity, "platform returned no data, skipping check");
            return CheckReport::aborted(entity);
        }

        let Evaluation { events, next } = evaluate(&prior, &snapshot, self.digest_mode);

        let channel = self.runtime.snapshot().notification_channel.clone();
        let noticed_at = Utc::now();
        let mut kinds = Vec::with_capacity(events.len());

        for event in &events {
            let kind = event.kind();
            tracing::info!(
                target: ALERT_TARGET,
                app = %event.entity(),
                kind = %kind,
                channel = %channel,
                "alert"
            );
            self.notifier
                .publish(&event.render(noticed_at), &channel)
                .await;
            self.metrics.record_alert(kind);
            kinds.push(kind);
        }

        let persisted = match self.store.save(&next).await {
            Ok(()) => true,
            Err(e) => {
                // Next pass compares against the old state and may alert again.
                tracing::error!(
                    app = %entity,
                    backend = self.store.backend(),
                    error = %e,
                    "failed to persist state"
                );
                self.metrics.record_store_failure("save");
                false
            }
        };

        CheckReport::completed(entity, kinds, persisted)
    }
}

#[async_trait]
impl HealthCheck for HealthCheckOrchestrator {
    async fn run_check(&self, entity: &str) -> CheckReport {
        let started = Instant::now();
        tracing::debug!(app = %entity, "health check started");

        let report = self.pass(entity).await;

        let elapsed = started.elapsed();
        self.metrics
            .record_check(report.aborted, elapsed.as_secs_f64());
        tracing::info!(
            app = %entity,
            alerts = report.events.len(),
            persisted = report.persisted,
            aborted = report.aborted,
            duration_ms = elapsed.as_millis() as u64,
            "health check finished"
        );
        report
    }
}
