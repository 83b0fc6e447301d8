//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{preview, Notifier, NotifyError, ResponseSink, SlashResponse};
use crate::config::SlackConfig;

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack bot client. Posts alerts with `chat.postMessage` and answers
/// slash commands through their `response_url`.
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    api_url: String,
    token: String,
}

impl SlackClient {
    /// Build a client. Returns `None` when no bot token is configured.
    pub fn from_config(config: &SlackConfig) -> Result<Option<Self>, NotifyError> {
        match &config.bot_token {
            Some(token) => Self::new(token, &config.api_url, config.timeout).map(Some),
            None => Ok(None),
        }
    }

    pub fn new(token: &str, api_url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("heroku_watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Post `text` to `channel`.
    pub async fn post_message(&self, text: &str, channel: &str) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&PostMessage { channel, text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        let reply: ApiReply = resp.json().await?;
        check_reply(reply)
    }

    /// Post a reply to a slash-command `response_url`.
    pub async fn post_response(
        &self,
        response_url: &str,
        response: &SlashResponse,
    ) -> Result<(), NotifyError> {
        if !response_url.starts_with("https://") {
            return Err(NotifyError::InvalidResponseUrl(response_url.to_string()));
        }

        // The response URL carries its own authorization.
        let resp = self.http.post(response_url).json(response).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

fn check_reply(reply: ApiReply) -> Result<(), NotifyError> {
    if reply.ok {
        Ok(())
    } else {
        Err(NotifyError::Api(
            reply.error.unwrap_or_else(|| "unknown_error".into()),
        ))
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Notifier for SlackClient {
    async fn publish(&self, text: &str, channel: &str) {
        match self.post_message(text, channel).await {
            Ok(()) => tracing::info!(channel, preview = %preview(text), "slack message sent"),
            Err(e) => tracing::error!(channel, error = %e, "failed to send slack message"),
        }
    }
}

#[async_trait]
impl ResponseSink for SlackClient {
    async fn respond(&self, response_url: &str, response: &SlashResponse) {
        if let Err(e) = self.post_response(response_url, response).await {
            tracing::error!(error = %e, "failed to deliver slash command reply");
        }
    }
}
