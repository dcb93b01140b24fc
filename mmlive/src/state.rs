//! Live stream state

use crate::error::StreamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

/// Phase of the live screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Not mounted yet
    Idle,
    /// Asking the backend for the stream URL
    FetchingUrl,
    /// Player (re)loading a URL
    Connecting,
    Playing,
    /// Playback started but data stopped flowing
    Buffering,
    /// Playing without error for the whole stability window
    Stable,
    /// Nothing playing; see [`StreamState::error`]
    Error,
}

impl Phase {
    /// Phases where a player error is meaningful
    pub fn has_player(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Playing | Self::Buffering | Self::Stable
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingUrl => "fetching-url",
            Self::Connecting => "connecting",
            Self::Playing => "playing",
            Self::Buffering => "buffering",
            Self::Stable => "stable",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Mutable state of one live session
///
/// `retry_count` goes back to 0 whenever `is_stable` becomes true, and
/// `is_primary` only goes from true to false once per session (a user
/// retry is the only way back).
#[derive(Debug, Clone, PartialEq)]
pub struct StreamState {
    pub phase: Phase,
    pub current_url: Option<String>,
    pub is_primary: bool,
    pub retry_count: u32,
    pub is_playing: bool,
    pub is_stable: bool,
    pub last_error_at: Option<Instant>,
    /// Last processed error (or the terminal error in `Phase::Error`)
    pub error: Option<StreamError>,
    /// The one-time switch to the backup URL already happened
    pub failover_used: bool,
    /// Channel-status requests made in the current fetch round
    pub fetch_attempts: u32,
    /// Background polling of the resolver is running
    pub recovering: bool,
    pub(crate) last_error_hit_stable: bool,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            current_url: None,
            is_primary: true,
            retry_count: 0,
            is_playing: false,
            is_stable: false,
            last_error_at: None,
            error: None,
            failover_used: false,
            fetch_attempts: 0,
            recovering: false,
            last_error_hit_stable: false,
        }
    }
}

/// Snapshot published to the UI after every transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub phase: Phase,
    pub url: Option<String>,
    pub is_primary: bool,
    pub retry_count: u32,
    pub is_playing: bool,
    /// User-facing message (terminal error)
    pub message: Option<String>,
    /// Offline, polling silently in the background
    pub recovering: bool,
    pub keep_awake: bool,
}

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            url: None,
            is_primary: true,
            retry_count: 0,
            is_playing: false,
            message: None,
            recovering: false,
            keep_awake: false,
        }
    }
}

impl StatusReport {
    /// True when the UI should offer the manual "Retry" button
    pub fn can_retry(&self) -> bool {
        self.phase == Phase::Error
    }
}
