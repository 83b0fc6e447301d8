//! Integration tests for heroku_watch
//!
//! Each test starts the full HTTP stack in-process on an ephemeral port,
//! wired to a fake platform, a recording Slack client and an in-memory state
//! store, and talks to it over real HTTP.
//!
//! Run with: cargo test --test integration

mod helpers;

mod api;
mod dashboard;
mod health_check;
mod slack_command;
