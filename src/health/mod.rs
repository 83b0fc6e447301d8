//! Health checking of the monitored app.
//!
//! A pass loads the app's last known state, fetches a fresh snapshot from the
//! platform, diffs the two and announces what changed:
//!
//! | Sub-check | Alerts on | Baseline |
//! |-----------|-----------|----------|
//! | Dynos | transition into `crashed` or `down` | newly seen dynos never alert |
//! | Releases | newest version differs from the stored one | first version seen is stored silently |
//! | Config vars | digest differs from the stored one | first digest is stored silently |
//!
//! [`evaluate`] is the pure diff; [`HealthCheckOrchestrator`] wires it to the
//! platform, Slack and the state store.

mod alert;
mod digest;
mod evaluator;
mod orchestrator;

use async_trait::async_trait;

pub use alert::{AlertEvent, AlertKind};
pub use digest::{config_digest, DigestMode};
pub use evaluator::{evaluate, Evaluation, Snapshot};
pub use orchestrator::{CheckReport, HealthCheckOrchestrator};

/// One full check of an app. Implemented by [`HealthCheckOrchestrator`];
/// the scheduler only sees this trait.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn run_check(&self, entity: &str) -> CheckReport;
}
