//! Retry configuration of the live stream policy

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry, failover and stability settings
///
/// Durations are stored in milliseconds so the struct maps one to one onto
/// the `live` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Reconnections on the same URL before failover / giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Channel-status requests before reporting the stream offline
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    #[serde(default = "default_fetch_backoff_ms")]
    pub fetch_backoff_ms: u64,
    #[serde(default = "default_stability_window_ms")]
    pub stability_window_ms: u64,
    #[serde(default = "default_error_debounce_ms")]
    pub error_debounce_ms: u64,
    #[serde(default = "default_recovery_poll_ms")]
    pub recovery_poll_ms: u64,
    #[serde(default = "default_buffering_timeout_ms")]
    pub buffering_timeout_ms: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

fn default_fetch_attempts() -> u32 {
    DEFAULT_FETCH_ATTEMPTS
}

fn default_fetch_backoff_ms() -> u64 {
    DEFAULT_FETCH_BACKOFF_MS
}

fn default_stability_window_ms() -> u64 {
    DEFAULT_STABILITY_WINDOW_MS
}

fn default_error_debounce_ms() -> u64 {
    DEFAULT_ERROR_DEBOUNCE_MS
}

fn default_recovery_poll_ms() -> u64 {
    DEFAULT_RECOVERY_POLL_MS
}

fn default_buffering_timeout_ms() -> u64 {
    DEFAULT_BUFFERING_TIMEOUT_MS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            fetch_attempts: default_fetch_attempts(),
            fetch_backoff_ms: default_fetch_backoff_ms(),
            stability_window_ms: default_stability_window_ms(),
            error_debounce_ms: default_error_debounce_ms(),
            recovery_poll_ms: default_recovery_poll_ms(),
            buffering_timeout_ms: default_buffering_timeout_ms(),
        }
    }
}

impl RetryConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_ms)
    }

    pub fn stability_window(&self) -> Duration {
        Duration::from_millis(self.stability_window_ms)
    }

    pub fn error_debounce(&self) -> Duration {
        Duration::from_millis(self.error_debounce_ms)
    }

    pub fn recovery_poll(&self) -> Duration {
        Duration::from_millis(self.recovery_poll_ms)
    }

    pub fn buffering_timeout(&self) -> Duration {
        Duration::from_millis(self.buffering_timeout_ms)
    }

    /// At least one fetch is always made
    pub fn fetch_budget(&self) -> u32 {
        self.fetch_attempts.max(1)
    }
}
