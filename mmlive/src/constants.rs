//! Default timings of the live stream policy.
//!
//! All of them can be overridden through [`RetryConfig`](crate::RetryConfig)
//! (and the `live` section of the configuration file).

// ============================================================================
// Player retries
// ============================================================================

/// Automatic reconnections on the same URL before giving up on it
///
/// Once exhausted on the primary URL the policy switches to the backup URL
/// (once per session).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before reloading the player after an error (milliseconds)
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;

// ============================================================================
// Stream URL resolution
// ============================================================================

/// Channel-status requests made before reporting the stream offline
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Fixed pause between two channel-status requests (milliseconds)
pub const DEFAULT_FETCH_BACKOFF_MS: u64 = 2_000;

/// Background poll period while offline (milliseconds)
///
/// Value: 30 seconds. Silent: the user only sees the offline message and a
/// "reconnecting" indicator.
pub const DEFAULT_RECOVERY_POLL_MS: u64 = 30_000;

// ============================================================================
// Stability
// ============================================================================

/// Error-free playback needed before the connection counts as stable
/// (milliseconds)
pub const DEFAULT_STABILITY_WINDOW_MS: u64 = 10_000;

/// Errors closer than this to an error that hit a stable connection are
/// dropped (milliseconds)
pub const DEFAULT_ERROR_DEBOUNCE_MS: u64 = 5_000;

/// Longest tolerated buffering before the stream is considered stalled
/// (milliseconds)
pub const DEFAULT_BUFFERING_TIMEOUT_MS: u64 = 20_000;

/// Message shown when no stream URL could be obtained
pub const OFFLINE_MESSAGE: &str = "stream offline";

/// Error code reported when buffering exceeds the watchdog
pub const STALLED_CODE: &str = "stalled";
