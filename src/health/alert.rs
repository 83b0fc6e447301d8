//! Alert events produced by a health check pass.

use std::fmt;

use chrono::{DateTime, Utc};

/// Kind of transition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    InstanceCrashed,
    InstanceDown,
    NewRelease,
    ConfigChanged,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstanceCrashed => "instance_crashed",
            Self::InstanceDown => "instance_down",
            Self::NewRelease => "new_release",
            Self::ConfigChanged => "config_changed",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition worth telling the channel about.
///
/// Created fresh on every evaluation; nothing about an event is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    InstanceCrashed {
        entity: String,
        instance: String,
        process_type: String,
    },
    InstanceDown {
        entity: String,
        instance: String,
        process_type: String,
    },
    NewRelease {
        entity: String,
        version: u64,
        author: String,
        description: String,
        created_at: Option<DateTime<Utc>>,
    },
    /// Carries no variable names or values.
    ConfigChanged { entity: String },
}

impl AlertEvent {
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::InstanceCrashed { .. } => AlertKind::InstanceCrashed,
            Self::InstanceDown { .. } => AlertKind::InstanceDown,
            Self::NewRelease { .. } => AlertKind::NewRelease,
            Self::ConfigChanged { .. } => AlertKind::ConfigChanged,
        }
    }

    pub fn entity(&self) -> &str {
        match self {
            Self::InstanceCrashed { entity, .. }
            | Self::InstanceDown { entity, .. }
            | Self::NewRelease { entity, .. }
            | Self::ConfigChanged { entity } => entity,
        }
    }

    /// Slack message text (mrkdwn).
    pub fn render(&self, noticed_at: DateTime<Utc>) -> String {
        match self {
            Self::InstanceCrashed {
                entity,
                instance,
                process_type,
            } => format!(
                "🚨 *Dyno Crash Detected* 🚨\nApp: `{}`\n• {} ({})",
                entity, instance, process_type
            ),
            Self::InstanceDown {
                entity,
                instance,
                process_type,
            } => format!(
                "⚠️ *Dynos Down* ⚠️\nApp: `{}`\n• {} ({})",
                entity, instance, process_type
            ),
            Self::NewRelease {
                entity,
                version,
                author,
                description,
                created_at,
            } => format!(
                "🚀 *New Deploy Detected at {}* 🚀\n\n\
                 App: `{}`\n\
                 Version: v{}\n\
                 Deployed by: {}\n\
                 Description: {}\n\
                 Time: {}\n\n\
                 _Monitoring for issues..._",
                noticed_at.format("%Y-%m-%d %H:%M:%S UTC"),
                entity,
                version,
                author,
                description,
                created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ),
            Self::ConfigChanged { entity } => format!(
                "⚙️ *Config Vars Changed at {}* ⚙️\nApp: `{}`\nReview changes in Heroku dashboard.",
                noticed_at.to_rfc3339(),
                entity
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_crash() {
        let event = AlertEvent::InstanceCrashed {
            entity: "myapp".into(),
            instance: "web.1".into(),
            process_type: "web".into(),
        };
        let text = event.render(Utc::now());
        assert!(text.contains("Dyno Crash Detected"));
        assert!(text.contains("`myapp`"));
        assert!(text.contains("web.1 (web)"));
    }

    #[test]
    fn test_render_release() {
        let noticed = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let event = AlertEvent::NewRelease {
            entity: "myapp".into(),
            version: 11,
            author: "dev@example.com".into(),
            description: "Deploy abc123".into(),
            created_at: None,
        };
        let text = event.render(noticed);
        assert!(text.contains("New Deploy Detected at 2024-03-01 12:30:00 UTC"));
        assert!(text.contains("Version: v11"));
        assert!(text.contains("Deployed by: dev@example.com"));
        assert!(text.contains("Description: Deploy abc123"));
    }

    #[test]
    fn test_kind_names() {
        let event = AlertEvent::ConfigChanged {
            entity: "myapp".into(),
        };
        assert_eq!(event.kind(), AlertKind::ConfigChanged);
        assert_eq!(event.kind().to_string(), "config_changed");
        assert_eq!(event.entity(), "myapp");
    }
}
