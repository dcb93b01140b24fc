//! Where the live stream URL comes from

use crate::error::StreamError;
use async_trait::async_trait;
use mmapi::MinistryClient;
use tracing::debug;

/// Source of the primary stream URL
///
/// Failures are returned, never raised: the session treats them as
/// "offline" and applies its own retry budget.
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn fetch_stream_url(&self) -> Result<String, StreamError>;
}

#[async_trait]
impl StreamSource for MinistryClient {
    async fn fetch_stream_url(&self) -> Result<String, StreamError> {
        match self.channel_status().await {
            Ok(status) => Ok(status.stream_url.trim().to_string()),
            Err(e) => {
                debug!("Channel status unavailable: {}", e);
                Err(StreamError::network(e.to_string()))
            }
        }
    }
}

/// Fixed URL (or permanently offline) source
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    url: Option<String>,
}

impl StaticSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    /// A source that never has a stream
    pub fn offline() -> Self {
        Self { url: None }
    }
}

#[async_trait]
impl StreamSource for StaticSource {
    async fn fetch_stream_url(&self) -> Result<String, StreamError> {
        self.url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StreamError::network("no stream URL configured"))
    }
}
