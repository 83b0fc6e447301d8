//! Notifier error types.

use std::fmt;

/// Errors raised while delivering a message.
#[derive(Debug)]
pub enum NotifyError {
    /// Transport failure or timeout.
    Http(reqwest::Error),
    /// Non-success HTTP status.
    Status(u16),
    /// Slack answered `{"ok": false, "error": ...}`.
    Api(String),
    /// Response URL is not an https URL.
    InvalidResponseUrl(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Http(e) => write!(f, "slack request failed: {}", e),
            NotifyError::Status(code) => write!(f, "slack returned HTTP {}", code),
            NotifyError::Api(code) => write!(f, "slack API error: {}", code),
            NotifyError::InvalidResponseUrl(url) => {
                write!(f, "refusing to post to response url '{}'", url)
            }
        }
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NotifyError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Http(e)
    }
}
