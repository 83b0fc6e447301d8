//! Outbound messaging: channel alerts and slash-command replies.
//!
//! Both traits are fire-and-forget. Delivery failures are logged by the
//! implementation and never reach the caller, so a broken Slack token can
//! not stop a health check from persisting its state.

mod error;
mod slack;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::NotifyError;
pub use slack::SlackClient;

/// Posts text to a channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, text: &str, channel: &str);
}

/// Visibility of a slash-command reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only the invoking user sees it.
    Ephemeral,
    /// Posted to the channel.
    InChannel,
}

/// Body of a slash-command reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashResponse {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlashResponse {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }

    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }
}

/// Delivers deferred slash-command replies to a Slack `response_url`.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn respond(&self, response_url: &str, response: &SlashResponse);
}

/// Stand-in used when no bot token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn publish(&self, text: &str, channel: &str) {
        tracing::warn!(
            channel,
            preview = %preview(text),
            "slack not configured, dropping message"
        );
    }
}

#[async_trait]
impl ResponseSink for DisabledNotifier {
    async fn respond(&self, _response_url: &str, response: &SlashResponse) {
        tracing::warn!(
            preview = %preview(&response.text),
            "slack not configured, dropping reply"
        );
    }
}

/// First 50 characters, for log lines.
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(50).collect();
    if text.chars().nth(50).is_some() {
        out.push_str("...");
    }
    out
}
