//! Runtime configuration and the control facade over it.
//!
//! [`RuntimeConfig`] (monitored app, alert channel, poll interval) starts from
//! the environment and is changed at runtime from the dashboard. It is always
//! replaced as a whole so readers never see a half-applied update.

mod runtime;
mod service;

pub use runtime::{
    RuntimeConfig, RuntimeConfigHandle, ValidationError, MAX_INTERVAL_MINUTES,
    MIN_INTERVAL_MINUTES,
};
pub use service::{ConfigChange, Credentials, Monitor};
