//! Error types for live stream handling

use serde::{Deserialize, Serialize};

/// Why the stream is not playing
///
/// `NetworkFailure` and `PlaybackFailure` are retried automatically;
/// `ExhaustedRetries` stays until the user retries or background recovery
/// finds a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StreamError {
    /// The stream URL could not be fetched (timeout, HTTP error, offline)
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The player reported a decode or stream error
    #[error("playback failure (code {code})")]
    PlaybackFailure { code: String },

    /// Every automatic retry was used
    #[error("{message}")]
    ExhaustedRetries { message: String },
}

impl StreamError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkFailure(msg.into())
    }

    pub fn playback(code: impl Into<String>) -> Self {
        Self::PlaybackFailure { code: code.into() }
    }

    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::ExhaustedRetries {
            message: message.into(),
        }
    }

    /// True if the policy will not retry on its own
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. })
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the session API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A player message did not match the boundary protocol
    #[error("Unknown player message: {0}")]
    UnknownMessage(String),

    /// The session task already stopped
    #[error("Live session closed")]
    SessionClosed,

    /// The session task panicked
    #[error("Live session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
