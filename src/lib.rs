//! heroku_watch - Heroku app monitor that reports to Slack.
//!
//! Polls the Heroku Platform API for one app on a configurable interval,
//! compares what it sees with the state persisted after the previous pass,
//! and posts alerts for crashed dynos, new releases and config var changes.
//!
//! # Architecture
//!
//! ```text
//! Scheduler ──► ExecutionGuard ──► HealthCheckOrchestrator
//!                                     │  load prior ◄── StateStore
//!                                     │  fetch      ◄── SnapshotSource (Heroku)
//!                                     │  evaluate       (pure)
//!                                     │  publish    ──► Notifier (Slack)
//!                                     └  save       ──► StateStore
//! ```
//!
//! The dashboard ([`server`]) changes the monitored app, channel and interval
//! at runtime through [`monitor::Monitor`], and answers the `/heroku-status`
//! slash command through a bounded worker pool ([`status`]).

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod health;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod observability;
pub mod platform;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod status;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::Config;
