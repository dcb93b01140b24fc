//! Messages exchanged with the embedded player
//!
//! The player page posts plain strings: `loadstart`, `loadedmetadata`,
//! `canplay`, `playing`, `waiting`, `stalled` and `error:<code>`.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle event reported by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    LoadStart,
    LoadedMetadata,
    CanPlay,
    Playing,
    Waiting,
    Stalled,
    /// Fatal decode or network error, with the player's code
    Error(String),
}

impl PlaybackEvent {
    /// Events meaning "data is not flowing right now"
    pub fn is_buffering(&self) -> bool {
        matches!(self, Self::Waiting | Self::Stalled)
    }
}

impl FromStr for PlaybackEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let msg = s.trim();
        if let Some(rest) = msg.strip_prefix("error") {
            // "error" seul ou "error:<code>"
            let code = match rest.strip_prefix(':') {
                Some(code) => code.trim(),
                None if rest.is_empty() => "",
                None => return Err(Error::UnknownMessage(msg.to_string())),
            };
            let code = if code.is_empty() { "unknown" } else { code };
            return Ok(Self::Error(code.to_string()));
        }

        match msg.to_ascii_lowercase().as_str() {
            "loadstart" => Ok(Self::LoadStart),
            "loadedmetadata" => Ok(Self::LoadedMetadata),
            "canplay" => Ok(Self::CanPlay),
            "playing" => Ok(Self::Playing),
            "waiting" => Ok(Self::Waiting),
            "stalled" => Ok(Self::Stalled),
            _ => Err(Error::UnknownMessage(msg.to_string())),
        }
    }
}

impl fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadStart => f.write_str("loadstart"),
            Self::LoadedMetadata => f.write_str("loadedmetadata"),
            Self::CanPlay => f.write_str("canplay"),
            Self::Playing => f.write_str("playing"),
            Self::Waiting => f.write_str("waiting"),
            Self::Stalled => f.write_str("stalled"),
            Self::Error(code) => write!(f, "error:{}", code),
        }
    }
}
