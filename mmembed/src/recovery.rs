//! Error recovery of the embedded YouTube player.
//!
//! The video screen first shows the IFrame API player on the standard host.
//! When the player reports an error it is reloaded on the alternate host,
//! then replaced by a plain iframe embed, and finally by a "watch on
//! YouTube" link. Errors the embed can never recover from (bad id,
//! embedding disabled by the owner, removed video) go straight to the link.

use crate::error::{Error, Result};
use crate::html::{render_fallback_iframe, render_iframe_api_player, EmbedHost};
use crate::video_id::watch_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default number of reloads on the alternate host
pub const DEFAULT_ALTERNATE_ATTEMPTS: u32 = 1;

/// Error codes of the YouTube IFrame API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YouTubeErrorCode {
    /// 2: invalid parameter (malformed video id)
    InvalidParameter,
    /// 5: HTML5 player error
    Html5Error,
    /// 100: video removed or private
    NotFound,
    /// 101: owner does not allow embedding
    EmbeddingNotAllowed,
    /// 150: same as 101
    EmbeddingNotAllowedAlias,
    /// Anything else (including non-numeric host codes)
    Other(u32),
}

impl YouTubeErrorCode {
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => Self::InvalidParameter,
            5 => Self::Html5Error,
            100 => Self::NotFound,
            101 => Self::EmbeddingNotAllowed,
            150 => Self::EmbeddingNotAllowedAlias,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidParameter => 2,
            Self::Html5Error => 5,
            Self::NotFound => 100,
            Self::EmbeddingNotAllowed => 101,
            Self::EmbeddingNotAllowedAlias => 150,
            Self::Other(code) => *code,
        }
    }

    pub fn is_embedding_disabled(&self) -> bool {
        matches!(self, Self::EmbeddingNotAllowed | Self::EmbeddingNotAllowedAlias)
    }

    /// No other player can show this video
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidParameter | Self::NotFound) || self.is_embedding_disabled()
    }
}

impl fmt::Display for YouTubeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidParameter => "invalid video id",
            Self::Html5Error => "HTML5 player error",
            Self::NotFound => "video not found or private",
            Self::EmbeddingNotAllowed | Self::EmbeddingNotAllowedAlias => {
                "embedding disabled by the owner"
            }
            Self::Other(_) => "player error",
        };
        write!(f, "{} ({})", text, self.code())
    }
}

/// Message posted by the API player page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerMessage {
    Ready,
    /// `YT.PlayerState` value (1 = playing)
    State(i32),
    Error(YouTubeErrorCode),
}

impl FromStr for PlayerMessage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let msg = s.trim();
        if msg == "ready" {
            return Ok(Self::Ready);
        }
        if let Some(state) = msg.strip_prefix("state:") {
            return state
                .trim()
                .parse::<i32>()
                .map(Self::State)
                .map_err(|_| Error::UnknownMessage(msg.to_string()));
        }
        if let Some(code) = msg.strip_prefix("error:") {
            // Codes non numériques (api-unavailable…) : erreur générique
            let code = code.trim().parse::<u32>().unwrap_or(0);
            return Ok(Self::Error(YouTubeErrorCode::from_code(code)));
        }
        Err(Error::UnknownMessage(msg.to_string()))
    }
}

/// What the video screen currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedStage {
    ApiPlayer(EmbedHost),
    FallbackIframe,
    /// Only the "watch on YouTube" link is left
    Failed,
}

/// What the host must do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedAction {
    /// Load this page in the web view
    Render(String),
    /// Replace the player by a link to this URL
    ShowWatchLink(String),
}

/// Recovery state machine for one video
#[derive(Debug, Clone)]
pub struct EmbedRecovery {
    video_id: String,
    alternate_attempts: u32,
    alternate_used: u32,
    stage: EmbedStage,
    healthy: bool,
    last_error: Option<YouTubeErrorCode>,
}

impl EmbedRecovery {
    pub fn new(video_id: impl Into<String>, alternate_attempts: u32) -> Self {
        Self {
            video_id: video_id.into(),
            alternate_attempts,
            alternate_used: 0,
            stage: EmbedStage::ApiPlayer(EmbedHost::Standard),
            healthy: false,
            last_error: None,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn stage(&self) -> EmbedStage {
        self.stage
    }

    /// The player reported `ready` or started playing
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn last_error(&self) -> Option<YouTubeErrorCode> {
        self.last_error
    }

    pub fn watch_url(&self) -> String {
        watch_url(&self.video_id)
    }

    /// Action showing the current stage
    pub fn current(&self) -> EmbedAction {
        match self.stage {
            EmbedStage::ApiPlayer(host) => {
                EmbedAction::Render(render_iframe_api_player(&self.video_id, host))
            }
            EmbedStage::FallbackIframe => {
                EmbedAction::Render(render_fallback_iframe(&self.video_id))
            }
            EmbedStage::Failed => EmbedAction::ShowWatchLink(self.watch_url()),
        }
    }

    /// Handle a raw page message; `Ok(None)` when nothing has to change
    pub fn on_message(&mut self, message: &str) -> Result<Option<EmbedAction>> {
        Ok(match message.parse::<PlayerMessage>()? {
            PlayerMessage::Ready => {
                self.mark_healthy();
                None
            }
            PlayerMessage::State(state) => {
                if state == 1 {
                    self.mark_healthy();
                }
                None
            }
            PlayerMessage::Error(code) => self.on_error(code),
        })
    }

    /// Handle a player error; returns the new action if the stage changed
    pub fn on_error(&mut self, code: YouTubeErrorCode) -> Option<EmbedAction> {
        if self.stage == EmbedStage::Failed {
            debug!(video = %self.video_id, %code, "Embed already failed");
            return None;
        }

        warn!(video = %self.video_id, stage = ?self.stage, %code, "Embedded player error");
        self.healthy = false;
        self.last_error = Some(code);

        self.stage = if code.is_terminal() {
            EmbedStage::Failed
        } else {
            match self.stage {
                EmbedStage::ApiPlayer(host) if self.alternate_used < self.alternate_attempts => {
                    self.alternate_used += 1;
                    EmbedStage::ApiPlayer(host.alternate())
                }
                EmbedStage::ApiPlayer(_) => EmbedStage::FallbackIframe,
                EmbedStage::FallbackIframe | EmbedStage::Failed => EmbedStage::Failed,
            }
        };

        info!(video = %self.video_id, stage = ?self.stage, "Embed recovery step");
        Some(self.current())
    }

    /// Start over on the standard host (user pressed "retry")
    pub fn reset(&mut self) -> EmbedAction {
        self.alternate_used = 0;
        self.stage = EmbedStage::ApiPlayer(EmbedHost::Standard);
        self.healthy = false;
        self.last_error = None;
        self.current()
    }

    fn mark_healthy(&mut self) {
        if !self.healthy {
            debug!(video = %self.video_id, "Embedded player healthy");
        }
        self.healthy = true;
    }
}
