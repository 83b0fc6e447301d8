//! Core types shared by the platform client, the evaluator and the store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration-variable mapping of an app. Sorted by key.
pub type ConfigVars = BTreeMap<String, String>;

// =============================================================================
// Instance Status
// =============================================================================

/// Observed status of one process instance (a dyno).
///
/// Parsing is total: the platform's `up` maps to `Running` and any value we
/// do not know maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Running,
    Crashed,
    Down,
    Starting,
    Idle,
    Restarting,
    Unknown,
}

impl InstanceStatus {
    /// Lowercase name, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Crashed => "crashed",
            Self::Down => "down",
            Self::Starting => "starting",
            Self::Idle => "idle",
            Self::Restarting => "restarting",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a platform or persisted status string.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "running" => Self::Running,
            "crashed" => Self::Crashed,
            "down" => Self::Down,
            "starting" => Self::Starting,
            "idle" => Self::Idle,
            "restarting" => Self::Restarting,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for InstanceStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        status.as_str().to_string()
    }
}

// =============================================================================
// Platform Records
// =============================================================================

/// One running process unit of an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Instance name, e.g. `web.1`.
    pub name: String,
    /// Process type, e.g. `web`, `worker`.
    pub process_type: String,
    pub status: InstanceStatus,
}

impl Instance {
    pub fn new(
        name: impl Into<String>,
        process_type: impl Into<String>,
        status: InstanceStatus,
    ) -> Self {
        Self {
            name: name.into(),
            process_type: process_type.into(),
            status,
        }
    }
}

/// A deployed version of an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: u64,
    pub description: String,
    /// Email of the user who created the release.
    pub author_email: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Process formation entry: how many of which size run a process type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationEntry {
    pub process_type: String,
    pub quantity: u32,
    pub size: String,
}

/// An installed add-on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addon {
    pub name: String,
    pub plan: String,
    pub state: String,
}

/// General app information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub owner_email: Option<String>,
    pub region: Option<String>,
    pub stack: Option<String>,
    pub web_url: Option<String>,
}

/// Sort releases newest first.
pub fn sort_releases_desc(releases: &mut [Release]) {
    releases.sort_by(|a, b| b.version.cmp(&a.version));
}
