//! Platform API error types.

use std::fmt;

/// Errors raised while talking to the platform API.
///
/// These never leave [`HerokuClient`](super::HerokuClient): its public
/// methods log them and return `None`.
#[derive(Debug)]
pub enum SourceError {
    /// Transport failure, timeout or undecodable body.
    Http(reqwest::Error),
    /// Non-success status.
    Status {
        status: u16,
        path: String,
        message: String,
    },
    /// The API rejected the key (401/403).
    InvalidCredentials,
}

impl SourceError {
    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Http(e) if e.is_timeout())
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Http(e) => write!(f, "platform request failed: {}", e),
            SourceError::Status {
                status,
                path,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "platform returned {} for {}", status, path)
                } else {
                    write!(f, "platform returned {} for {}: {}", status, path, message)
                }
            }
            SourceError::InvalidCredentials => write!(f, "platform rejected the API key"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Http(e)
    }
}
