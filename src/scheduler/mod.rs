//! Periodic health check scheduling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Scheduler                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  reconfigure() ──► registration lock ──► watch<Option<Job>>  │
//! │                                               │              │
//! │                                       ┌───────▼───────┐      │
//! │                                       │ driver task   │      │
//! │                                       │ (one per      │      │
//! │                                       │  process)     │      │
//! │                                       └───────┬───────┘      │
//! │                                               │ tick         │
//! │                                       ┌───────▼───────┐      │
//! │  run_job() ─────────────────────────► │ execution     │      │
//! │  (on demand)                          │ guard         │      │
//! │                                       └───────┬───────┘      │
//! │                                               ▼              │
//! │                                        HealthCheck           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is at most one job, identified by [`JOB_ID`]. The registration lock
//! decides how many jobs exist; the execution guard decides how many passes
//! run. They are separate because they protect different races.

mod guard;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::health::{CheckReport, HealthCheck};
use crate::monitor::RuntimeConfig;
use crate::observability::Metrics;

pub use guard::{ExecutionGuard, ExecutionPermit};

/// Logical id of the health check job.
pub const JOB_ID: &str = "health_check";

/// The registered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    pub id: &'static str,
    pub entity: String,
    pub interval_minutes: u32,
    /// Incremented on every registration.
    pub generation: u64,
    pub registered_at: DateTime<Utc>,
}

impl JobInfo {
    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }

    fn same_schedule(&self, entity: &str, interval_minutes: u32) -> bool {
        self.entity == entity && self.interval_minutes == interval_minutes
    }
}

/// Coarse scheduler state for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No job registered.
    Uninitialized,
    /// Job registered, no pass executing.
    Registered,
    /// A pass is executing.
    Running,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Registered => "registered",
            Self::Running => "running",
        }
    }
}

/// Result of one invocation of the job callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRun {
    Completed(CheckReport),
    /// Another pass held the execution guard; this one was dropped.
    Skipped,
}

impl JobRun {
    pub fn is_skipped(&self) -> bool {
        matches!(self, JobRun::Skipped)
    }
}

/// Runs a pass under the execution guard. Shared with the driver task.
struct JobRunner {
    check: Arc<dyn HealthCheck>,
    guard: Arc<ExecutionGuard>,
    metrics: Arc<Metrics>,
}

impl JobRunner {
    async fn run(&self, entity: &str) -> JobRun {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::warn!(app = %entity, "previous check still running, skipping");
            self.metrics.record_skipped_run();
            return JobRun::Skipped;
        };

        JobRun::Completed(self.check.run_check(entity).await)
    }
}

#[derive(Default)]
struct Registration {
    job: Option<JobInfo>,
    driver: Option<JoinHandle<()>>,
    generation: u64,
}

/// Owner of the single repeating health check job.
pub struct Scheduler {
    runner: Arc<JobRunner>,
    registration: Mutex<Registration>,
    jobs: watch::Sender<Option<JobInfo>>,
    /// Lock-free view of `registration.driver.is_some()`.
    driver_started: AtomicBool,
}

impl Scheduler {
    pub fn new(check: Arc<dyn HealthCheck>, metrics: Arc<Metrics>) -> Self {
        let (jobs, _) = watch::channel(None);
        Self {
            runner: Arc::new(JobRunner {
                check,
                guard: Arc::new(ExecutionGuard::new()),
                metrics,
            }),
            registration: Mutex::new(Registration::default()),
            jobs,
            driver_started: AtomicBool::new(false),
        }
    }

    /// Replace the job.
    ///
    /// An identical schedule leaves the existing job alone. An empty entity
    /// or a zero interval cancels the job without registering another. The
    /// first run of a new job happens one interval after registration.
    pub async fn reconfigure(&self, entity: &str, interval_minutes: u32) -> Option<JobInfo> {
        let mut reg = self.registration.lock().await;
        self.register(&mut reg, entity, interval_minutes)
    }

    /// Register the job from `config` unless a job or driver already exists.
    ///
    /// Checked under the registration lock so a newer `reconfigure` is never
    /// overwritten by a stale startup config.
    pub async fn auto_init(&self, config: &RuntimeConfig) {
        let mut reg = self.registration.lock().await;
        if reg.job.is_some() || reg.driver.is_some() {
            return;
        }
        self.register(&mut reg, &config.monitored_entity, config.poll_interval_minutes);
    }

    fn register(
        &self,
        reg: &mut Registration,
        entity: &str,
        interval_minutes: u32,
    ) -> Option<JobInfo> {
        let entity = entity.trim();

        if let Some(job) = &reg.job {
            if job.same_schedule(entity, interval_minutes) {
                tracing::debug!(app = %entity, interval_minutes, "job unchanged");
                return Some(job.clone());
            }
        } else if entity.is_empty() || interval_minutes == 0 {
            return None;
        }

        if let Some(old) = reg.job.take() {
            tracing::info!(
                app = %old.entity,
                generation = old.generation,
                "health check job cancelled"
            );
        }
        self.runner.metrics.record_reconfiguration();

        if entity.is_empty() || interval_minutes == 0 {
            self.jobs.send_replace(None);
            tracing::info!("no app configured, health check job not registered");
            return None;
        }

        reg.generation += 1;
        let job = JobInfo {
            id: JOB_ID,
            entity: entity.to_string(),
            interval_minutes,
            generation: reg.generation,
            registered_at: Utc::now(),
        };
        self.jobs.send_replace(Some(job.clone()));
        reg.job = Some(job.clone());

        if reg.driver.is_none() {
            let rx = self.jobs.subscribe();
            reg.driver = Some(tokio::spawn(drive(rx, Arc::clone(&self.runner))));
            self.driver_started.store(true, Ordering::Release);
            tracing::debug!("scheduler driver started");
        }

        tracing::info!(
            app = %job.entity,
            interval_minutes,
            generation = job.generation,
            "health check job registered"
        );
        Some(job)
    }

    /// The job callback. Skipped when a pass is already executing.
    pub async fn run_job(&self, entity: &str) -> JobRun {
        self.runner.run(entity).await
    }

    pub fn state(&self) -> SchedulerState {
        if self.runner.guard.is_busy() {
            SchedulerState::Running
        } else if self.jobs.borrow().is_some() {
            SchedulerState::Registered
        } else {
            SchedulerState::Uninitialized
        }
    }

    pub fn job(&self) -> Option<JobInfo> {
        self.jobs.borrow().clone()
    }

    pub fn is_driver_running(&self) -> bool {
        self.driver_started.load(Ordering::Acquire)
    }

    /// Cancel the job and stop the driver. A pass already executing runs to
    /// completion.
    pub async fn shutdown(&self) {
        let mut reg = self.registration.lock().await;
        reg.job = None;
        self.jobs.send_replace(None);
        if let Some(driver) = reg.driver.take() {
            driver.abort();
            self.driver_started.store(false, Ordering::Release);
            tracing::info!("scheduler stopped");
        }
    }
}

/// Timer driver. Follows the latest job from `jobs`; exits when the
/// scheduler is dropped.
async fn drive(mut jobs: watch::Receiver<Option<JobInfo>>, runner: Arc<JobRunner>) {
    loop {
        let current = jobs.borrow_and_update().clone();

        let Some(job) = current else {
            if jobs.changed().await.is_err() {
                return;
            }
            continue;
        };

        let period = job.period();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = jobs.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                _ = ticker.tick() => {
                    let runner = Arc::clone(&runner);
                    let entity = job.entity.clone();
                    let generation = job.generation;
                    // Never block the driver on a pass.
                    tokio::spawn(async move {
                        tracing::debug!(app = %entity, generation, "scheduled check firing");
                        runner.run(&entity).await;
                    });
                }
            }
        }
    }
}
