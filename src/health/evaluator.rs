//! State diffing: prior state + fresh snapshot -> alerts + next state.

use std::collections::BTreeMap;

use super::alert::AlertEvent;
use super::digest::{config_digest, digest_mode_of, DigestMode};
use crate::state::MonitoredEntityState;
use crate::types::{sort_releases_desc, ConfigVars, Instance, InstanceStatus, Release};

/// Point-in-time read of an app.
///
/// Each part is `None` when its fetch failed. A missing part skips its
/// sub-check instead of being treated as empty.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub instances: Option<Vec<Instance>>,
    pub releases: Option<Vec<Release>>,
    pub config: Option<ConfigVars>,
}

impl Snapshot {
    /// True when every fetch failed.
    pub fn is_unavailable(&self) -> bool {
        self.instances.is_none() && self.releases.is_none() && self.config.is_none()
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Alerts in emission order: instances, then release, then config.
    pub events: Vec<AlertEvent>,
    /// State to persist.
    pub next: MonitoredEntityState,
}

/// Diff `snapshot` against `prior`.
///
/// `prior` is never modified. No alert is raised on first observation of
/// anything (no prior status, release or digest), and none for transitions
/// into a healthy state.
pub fn evaluate(prior: &MonitoredEntityState, snapshot: &Snapshot, mode: DigestMode) -> Evaluation {
    let entity = prior.entity_name.as_str();
    let mut events = Vec::new();
    let mut next = prior.clone();

    if let Some(instances) = &snapshot.instances {
        next.instance_status = diff_instances(entity, &prior.instance_status, instances, &mut events);
    }

    if let Some(releases) = &snapshot.releases {
        if let Some(version) =
            diff_releases(entity, prior.last_release.as_deref(), releases, &mut events)
        {
            next.last_release = Some(version);
        }
    }

    if let Some(config) = &snapshot.config {
        next.config_hash = Some(diff_config(
            entity,
            prior.config_hash.as_deref(),
            config,
            mode,
            &mut events,
        ));
    }

    Evaluation { events, next }
}

/// Returns the replacement status map. Instances missing from the snapshot
/// are dropped.
fn diff_instances(
    entity: &str,
    prior: &BTreeMap<String, InstanceStatus>,
    instances: &[Instance],
    events: &mut Vec<AlertEvent>,
) -> BTreeMap<String, InstanceStatus> {
    for instance in instances {
        let Some(previous) = prior.get(&instance.name) else {
            continue;
        };
        if *previous == instance.status {
            continue;
        }

        match instance.status {
            InstanceStatus::Crashed => events.push(AlertEvent::InstanceCrashed {
                entity: entity.to_string(),
                instance: instance.name.clone(),
                process_type: instance.process_type.clone(),
            }),
            InstanceStatus::Down => events.push(AlertEvent::InstanceDown {
                entity: entity.to_string(),
                instance: instance.name.clone(),
                process_type: instance.process_type.clone(),
            }),
            _ => {}
        }
    }

    instances
        .iter()
        .map(|i| (i.name.clone(), i.status))
        .collect()
}

/// Returns the newest version, or `None` when the list is empty.
fn diff_releases(
    entity: &str,
    prior: Option<&str>,
    releases: &[Release],
    events: &mut Vec<AlertEvent>,
) -> Option<String> {
    let mut sorted = releases.to_vec();
    sort_releases_desc(&mut sorted);
    let latest = sorted.into_iter().next()?;
    let version = latest.version.to_string();

    if let Some(previous) = prior {
        if previous != version {
            events.push(AlertEvent::NewRelease {
                entity: entity.to_string(),
                version: latest.version,
                author: if latest.author_email.is_empty() {
                    "Unknown".to_string()
                } else {
                    latest.author_email
                },
                description: if latest.description.is_empty() {
                    "No description".to_string()
                } else {
                    latest.description
                },
                created_at: latest.created_at,
            });
        }
    }

    Some(version)
}

/// Returns the new digest. A prior digest taken under another mode, or with
/// no mode recorded, is replaced silently.
fn diff_config(
    entity: &str,
    prior: Option<&str>,
    config: &ConfigVars,
    mode: DigestMode,
    events: &mut Vec<AlertEvent>,
) -> String {
    let digest = config_digest(config, mode);

    if let Some(previous) = prior.filter(|p| digest_mode_of(p) == Some(mode)) {
        if previous != digest {
            events.push(AlertEvent::ConfigChanged {
                entity: entity.to_string(),
            });
        }
    }

    digest
}
