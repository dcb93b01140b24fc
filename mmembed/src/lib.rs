//! # mmembed - YouTube embedding for the video screens
//!
//! Catalogue videos are hosted on YouTube. This crate turns whatever the
//! backend stores (bare id or any YouTube URL) into a video id, renders the
//! player pages shown in the web view and decides what to show next when
//! the embedded player fails.
//!
//! ```
//! use mmembed::{extract_video_id, EmbedAction, EmbedRecovery};
//!
//! let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
//! let mut recovery = EmbedRecovery::new(id, 1);
//!
//! // Owner disabled embedding: straight to the "watch on YouTube" link
//! let action = recovery.on_message("error:150").unwrap();
//! assert!(matches!(action, Some(EmbedAction::ShowWatchLink(_))));
//! ```

pub mod error;
pub mod html;
pub mod recovery;
pub mod video_id;

#[cfg(feature = "mmconfig")]
pub mod config_ext;

pub use error::{Error, Result};
pub use html::{render_fallback_iframe, render_iframe_api_player, EmbedHost};
pub use recovery::{EmbedAction, EmbedRecovery, EmbedStage, PlayerMessage, YouTubeErrorCode};
pub use video_id::{extract_video_id, is_video_id, watch_url};

#[cfg(feature = "mmconfig")]
pub use config_ext::EmbedConfigExt;
