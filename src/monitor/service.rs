//! Control facade used by the dashboard and the slash-command handler.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::runtime::{RuntimeConfig, RuntimeConfigHandle, ValidationError};
use crate::scheduler::{JobRun, Scheduler};
use crate::status::{StatusReporter, StatusSource};

/// Which external credentials are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Credentials {
    pub platform: bool,
    pub notifier: bool,
}

impl Credentials {
    pub fn complete(&self) -> bool {
        self.platform && self.notifier
    }
}

/// Result of an accepted reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub previous: Arc<RuntimeConfig>,
    pub current: Arc<RuntimeConfig>,
    /// Whether the scheduler job was replaced.
    pub rescheduled: bool,
}

pub struct Monitor {
    runtime: RuntimeConfigHandle,
    scheduler: Arc<Scheduler>,
    reporter: StatusReporter,
    credentials: Credentials,
    /// Whether this process owns the scheduler (deployment role).
    schedules: bool,
    update_lock: Mutex<()>,
}

impl Monitor {
    pub fn new(
        runtime: RuntimeConfigHandle,
        scheduler: Arc<Scheduler>,
        reporter: StatusReporter,
        credentials: Credentials,
        schedules: bool,
    ) -> Self {
        Self {
            runtime,
            scheduler,
            reporter,
            credentials,
            schedules,
            update_lock: Mutex::new(()),
        }
    }

    pub fn runtime(&self) -> &RuntimeConfigHandle {
        &self.runtime
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
    }

    /// Entity set and both credentials present, judged on one snapshot.
    pub fn is_monitoring_active(&self) -> bool {
        is_active(&self.runtime.snapshot(), self.credentials)
    }

    fn may_schedule(&self) -> bool {
        self.schedules && self.credentials.complete()
    }

    /// Validate and apply a new runtime configuration.
    ///
    /// On rejection nothing changes. The scheduler is reconfigured only when
    /// the entity or the interval changed.
    pub async fn reconfigure(
        &self,
        entity: &str,
        channel: &str,
        interval_minutes: u32,
    ) -> Result<ConfigChange, ValidationError> {
        let next = RuntimeConfig::validated(entity, channel, interval_minutes)?;

        let _update = self.update_lock.lock().await;
        let previous = self.runtime.swap(next);
        let current = self.runtime.snapshot();

        let schedule_changed = previous.monitored_entity != current.monitored_entity
            || previous.poll_interval_minutes != current.poll_interval_minutes;

        let rescheduled = schedule_changed && self.may_schedule();
        if rescheduled {
            self.scheduler
                .reconfigure(&current.monitored_entity, current.poll_interval_minutes)
                .await;
        }

        tracing::info!(
            app = %current.monitored_entity,
            channel = %current.notification_channel,
            interval_minutes = current.poll_interval_minutes,
            rescheduled,
            "runtime configuration updated"
        );

        Ok(ConfigChange {
            previous,
            current,
            rescheduled,
        })
    }

    /// Run a check now, through the scheduler's execution guard.
    pub async fn run_check(&self, entity: &str) -> JobRun {
        self.scheduler.run_job(entity).await
    }

    /// Read-only status text for `entity`.
    pub async fn status_report(&self, entity: &str) -> String {
        if !self.credentials.platform {
            return "❌ Heroku API not configured".to_string();
        }
        self.reporter.report(entity).await
    }

    /// Start the scheduler from the current configuration if this process
    /// schedules and nothing is registered yet.
    pub async fn auto_init(&self) {
        if !self.may_schedule() {
            return;
        }
        let config = self.runtime.snapshot();
        if !config.has_entity() {
            return;
        }
        self.scheduler.auto_init(&config).await;
    }
}

#[async_trait]
impl StatusSource for Monitor {
    async fn status_report(&self, entity: &str) -> String {
        Monitor::status_report(self, entity).await
    }
}

fn is_active(config: &RuntimeConfig, credentials: Credentials) -> bool {
    config.has_entity() && credentials.complete()
}
