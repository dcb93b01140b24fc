//! Error types for YouTube embedding

/// Result type alias for embed operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No YouTube video id could be found in the input
    #[error("Not a YouTube video: {0}")]
    InvalidVideoId(String),

    /// A player message did not match the boundary protocol
    #[error("Unknown player message: {0}")]
    UnknownMessage(String),
}
