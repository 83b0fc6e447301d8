//! Prometheus metrics for heroku_watch.
//!
//! Counts health check passes, the alerts they emit and the collaborator
//! failures they absorb.

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

use crate::health::AlertKind;

/// Prometheus metrics registry with all application metrics.
pub struct Metrics {
    registry: Registry,

    // === Health check ===
    /// Passes by outcome (completed, aborted)
    pub checks_total: CounterVec,

    /// Pass duration in seconds
    pub check_duration_seconds: Histogram,

    /// Alerts emitted by kind
    pub alerts_total: CounterVec,

    // === Collaborators ===
    /// Snapshot source fetches that returned no data
    pub source_failures_total: CounterVec,

    /// State store failures by operation (load, save)
    pub store_failures_total: CounterVec,

    // === Scheduler ===
    /// Timer fires dropped because a pass was already running
    pub skipped_runs_total: Counter,

    /// Scheduler job replacements
    pub reconfigurations_total: Counter,
}

impl Metrics {
    /// Create a new metrics registry with all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // A pass is three API calls plus a store round trip.
        let check_buckets = vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

        let checks_total = CounterVec::new(
            Opts::new("heroku_watch_checks_total", "Health check passes"),
            &["outcome"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let check_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "heroku_watch_check_duration_seconds",
                "Health check pass duration in seconds",
            )
            .buckets(check_buckets),
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let alerts_total = CounterVec::new(
            Opts::new("heroku_watch_alerts_total", "Alerts emitted"),
            &["kind"],
        )?;
        registry.register(Box::new(alerts_total.clone()))?;

        let source_failures_total = CounterVec::new(
            Opts::new(
                "heroku_watch_source_failures_total",
                "Platform fetches that returned no data",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(source_failures_total.clone()))?;

        let store_failures_total = CounterVec::new(
            Opts::new(
                "heroku_watch_store_failures_total",
                "State store operations that failed",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(store_failures_total.clone()))?;

        let skipped_runs_total = Counter::new(
            "heroku_watch_skipped_runs_total",
            "Scheduled runs dropped because a check was in progress",
        )?;
        registry.register(Box::new(skipped_runs_total.clone()))?;

        let reconfigurations_total = Counter::new(
            "heroku_watch_reconfigurations_total",
            "Scheduler reconfigurations",
        )?;
        registry.register(Box::new(reconfigurations_total.clone()))?;

        Ok(Self {
            registry,
            checks_total,
            check_duration_seconds,
            alerts_total,
            source_failures_total,
            store_failures_total,
            skipped_runs_total,
            reconfigurations_total,
        })
    }

    /// Record a finished pass.
    pub fn record_check(&self, aborted: bool, duration_secs: f64) {
        let outcome = if aborted { "aborted" } else { "completed" };
        self.checks_total.with_label_values(&[outcome]).inc();
        self.check_duration_seconds.observe(duration_secs);
    }

    pub fn record_alert(&self, kind: AlertKind) {
        self.alerts_total.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_source_failure(&self, operation: &str) {
        self.source_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    pub fn record_store_failure(&self, operation: &str) {
        self.store_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    pub fn record_skipped_run(&self) {
        self.skipped_runs_total.inc();
    }

    pub fn record_reconfiguration(&self) {
        self.reconfigurations_total.inc();
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "metrics encoding failed");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
