//! Read-only status reports for the `/heroku-status` slash command.
//!
//! Reports go straight to the platform. They never read or write the state
//! store and never raise alerts.

mod error;
mod pool;

use std::sync::Arc;

use async_trait::async_trait;

use crate::platform::SnapshotSource;
use crate::types::{sort_releases_desc, Addon, AppInfo, FormationEntry, Instance, Release};

pub use error::{PoolError, PoolResult};
pub use pool::{StatusPool, StatusRequest};

/// Releases listed in a report.
const REPORT_RELEASES: usize = 3;

/// Anything that can produce status text for an app.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn status_report(&self, entity: &str) -> String;
}

/// Builds the Slack status text for an app.
#[derive(Clone)]
pub struct StatusReporter {
    source: Arc<dyn SnapshotSource>,
}

impl StatusReporter {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    pub async fn report(&self, entity: &str) -> String {
        let (app_info, instances, formation, releases, addons) = tokio::join!(
            self.source.app_info(entity),
            self.source.instances(entity),
            self.source.formation(entity),
            self.source.releases(entity),
            self.source.addons(entity),
        );

        let Some(app_info) = app_info else {
            return format!("❌ Could not fetch info for app: {}", entity);
        };

        render_report(
            entity,
            &app_info,
            instances.as_deref().unwrap_or_default(),
            formation.as_deref().unwrap_or_default(),
            releases.unwrap_or_default(),
            addons.as_deref().unwrap_or_default(),
        )
    }
}

#[async_trait]
impl StatusSource for StatusReporter {
    async fn status_report(&self, entity: &str) -> String {
        self.report(entity).await
    }
}

fn render_report(
    entity: &str,
    app: &AppInfo,
    instances: &[Instance],
    formation: &[FormationEntry],
    mut releases: Vec<Release>,
    addons: &[Addon],
) -> String {
    let mut out = format!("📊 *Heroku App Status: {}* 📊\n\n", entity);

    out.push_str(&format!(
        "*App Details:*\n• Name: `{}`\n• Owner: {}\n• Region: {}\n• Stack: {}\n• Web URL: {}\n\n",
        app.name,
        app.owner_email.as_deref().unwrap_or("Unknown"),
        app.region.as_deref().unwrap_or("Unknown"),
        app.stack.as_deref().unwrap_or("Unknown"),
        app.web_url.as_deref().unwrap_or("N/A"),
    ));

    out.push_str("*Dyno Status:*\n");
    if instances.is_empty() {
        out.push_str("No dynos currently running\n\n");
    } else {
        out.push_str(&instance_summary(instances));
        out.push_str("\n\n");
    }

    if !formation.is_empty() {
        out.push_str("*Dyno Formation:*\n");
        for entry in formation {
            out.push_str(&format!(
                "• {}: {} x {}\n",
                entry.process_type, entry.quantity, entry.size
            ));
        }
        out.push('\n');
    }

    if !releases.is_empty() {
        sort_releases_desc(&mut releases);
        out.push_str("*Recent Releases:*\n");
        for release in releases.iter().take(REPORT_RELEASES) {
            let description = if release.description.is_empty() {
                "No description"
            } else {
                release.description.as_str()
            };
            out.push_str(&format!(
                "• v{}: {} ({})\n",
                release.version,
                description,
                release
                    .created_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default()
            ));
        }
        out.push('\n');
    }

    if addons.is_empty() {
        out.push_str("*Add-ons:* None\n");
    } else {
        out.push_str("*Add-ons:*\n");
        for addon in addons {
            out.push_str(&format!(
                "• {} ({}) - {}\n",
                addon.name, addon.plan, addon.state
            ));
        }
    }

    out
}

/// One line per process type, in first-seen order:
/// `• web: 2 dynos (1 running, 1 crashed)`.
fn instance_summary(instances: &[Instance]) -> String {
    // (process type, total, [(status, count)])
    let mut groups: Vec<(&str, usize, Vec<(&str, usize)>)> = Vec::new();

    for instance in instances {
        let idx = match groups
            .iter()
            .position(|(t, _, _)| *t == instance.process_type)
        {
            Some(idx) => idx,
            None => {
                groups.push((instance.process_type.as_str(), 0, Vec::new()));
                groups.len() - 1
            }
        };

        let (_, total, states) = &mut groups[idx];
        *total += 1;
        let status = instance.status.as_str();
        match states.iter_mut().find(|(s, _)| *s == status) {
            Some((_, count)) => *count += 1,
            None => states.push((status, 1)),
        }
    }

    groups
        .iter()
        .map(|(process_type, total, states)| {
            let states = states
                .iter()
                .map(|(status, count)| format!("{} {}", count, status))
                .collect::<Vec<_>>()
                .join(", ");
            format!("• {}: {} dynos ({})", process_type, total, states)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
