//! Error types for the Ministry Media backend client

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the backend
///
/// Every failure is reported through one of these variants; list
/// endpoints never degrade to an empty collection on error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, timeout, TLS…)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Credentials refused or token expired (401/403)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-2xx status
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// The envelope reported `success: false`
    #[error("Request rejected by server: {0}")]
    Rejected(String),

    /// The envelope reported success but carried no usable payload
    #[error("Missing data in response: {0}")]
    MissingData(String),

    /// The operation needs a logged-in user
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Client-side validation failed before sending
    #[error("Invalid request: {0}")]
    Invalid(String),

    /// Bootstrap context misuse (set twice…)
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// Configuration error (from mmconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Map an HTTP status code and body to an error variant
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            _ => Self::Api {
                code,
                message: message.into(),
            },
        }
    }

    /// Create a validation error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// True for authentication problems the user can fix by logging in again
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotAuthenticated)
    }

    /// True for transport-level failures (worth retrying)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(Error::from_status(401, "x"), Error::Unauthorized(_)));
        assert!(matches!(Error::from_status(403, "x"), Error::Unauthorized(_)));
        assert!(matches!(Error::from_status(404, "x"), Error::NotFound(_)));
        assert!(matches!(
            Error::from_status(502, "bad gateway"),
            Error::Api { code: 502, .. }
        ));
    }

    #[test]
    fn test_auth_error() {
        assert!(Error::NotAuthenticated.is_auth_error());
        assert!(Error::from_status(401, "expired").is_auth_error());
        assert!(!Error::invalid("empty body").is_auth_error());
    }
}
