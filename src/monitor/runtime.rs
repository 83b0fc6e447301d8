//! Operator-editable runtime configuration.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Shortest poll interval accepted, minutes.
pub const MIN_INTERVAL_MINUTES: u32 = 1;
/// Longest poll interval accepted, minutes.
pub const MAX_INTERVAL_MINUTES: u32 = 60;

/// What to monitor, where to alert and how often.
///
/// Read as a whole through [`RuntimeConfigHandle::snapshot`]; never mutated in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    /// Monitored app; empty disables monitoring.
    pub monitored_entity: String,
    pub notification_channel: String,
    pub poll_interval_minutes: u32,
}

impl RuntimeConfig {
    pub fn new(
        monitored_entity: impl Into<String>,
        notification_channel: impl Into<String>,
        poll_interval_minutes: u32,
    ) -> Self {
        Self {
            monitored_entity: monitored_entity.into(),
            notification_channel: notification_channel.into(),
            poll_interval_minutes,
        }
    }

    /// Check an operator-supplied configuration. Input is trimmed.
    pub fn validated(
        entity: &str,
        channel: &str,
        interval_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let entity = entity.trim();
        let channel = channel.trim();

        if entity.is_empty() {
            return Err(ValidationError::MissingEntity);
        }
        if channel.is_empty() {
            return Err(ValidationError::MissingChannel);
        }
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&interval_minutes) {
            return Err(ValidationError::IntervalOutOfRange(interval_minutes));
        }

        Ok(Self::new(entity, channel, interval_minutes))
    }

    pub fn has_entity(&self) -> bool {
        !self.monitored_entity.is_empty()
    }
}

/// Shared, atomically swapped [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct RuntimeConfigHandle {
    inner: Arc<RwLock<Arc<RuntimeConfig>>>,
}

impl RuntimeConfigHandle {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current configuration. All fields come from the same version.
    pub fn snapshot(&self) -> Arc<RuntimeConfig> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the configuration, returning the previous one.
    pub fn swap(&self, config: RuntimeConfig) -> Arc<RuntimeConfig> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(config))
    }
}

/// Rejected runtime configuration. The message is shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingEntity,
    MissingChannel,
    /// Interval was not a number.
    InvalidInterval(String),
    IntervalOutOfRange(u32),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingEntity => write!(f, "App name is required"),
            ValidationError::MissingChannel => write!(f, "Slack channel is required"),
            ValidationError::InvalidInterval(raw) => {
                write!(f, "Check interval must be a number, got '{}'", raw)
            }
            ValidationError::IntervalOutOfRange(_) => write!(
                f,
                "Check interval must be between {} and {} minutes",
                MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
