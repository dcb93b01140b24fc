//! # mmlive - Live stream acquisition and failover
//!
//! The live screen asks the backend for the stream URL, plays it, retries
//! on errors and switches once to a backup URL when the primary is
//! exhausted. While offline it polls the backend silently until the stream
//! comes back. A keep-awake lock is held exactly while the focused screen
//! is playing.
//!
//! ## Architecture
//!
//! - [`FailoverPolicy`]: pure state machine (inputs → effects), no I/O
//! - [`LiveSession`]: tokio task driving the policy (timers, resolver,
//!   keep-awake guard, status channel)
//! - [`StreamSource`]: where the primary URL comes from
//!   ([`mmapi::MinistryClient`] or [`StaticSource`])
//! - [`KeepAwake`]: platform wake lock
//! - [`render_live_player`]: player page posting the lifecycle messages
//!
//! ## Example
//!
//! ```no_run
//! use mmlive::{LiveSession, LogKeepAwake, RetryConfig};
//! use mmapi::MinistryClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MinistryClient::builder().build()?;
//!     let mut session = LiveSession::spawn(
//!         Arc::new(client),
//!         Arc::new(LogKeepAwake),
//!         RetryConfig::default(),
//!         Some("https://backup.example/live.m3u8".to_string()),
//!     );
//!
//!     if let Some(url) = session.next_load().await {
//!         println!("load {}", url);
//!         session.player_message("playing").await?;
//!     }
//!     println!("{:?}", session.current());
//!     session.unmount().await?;
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod events;
pub mod html;
pub mod keep_awake;
pub mod policy;
pub mod resolver;
pub mod retry;
pub mod session;
pub mod state;

#[cfg(feature = "mmconfig")]
pub mod config_ext;

pub use error::{Error, Result, StreamError};
pub use events::PlaybackEvent;
pub use html::{load_script, render_live_player};
pub use keep_awake::{KeepAwake, KeepAwakeGuard, LogKeepAwake};
pub use policy::{Effect, FailoverPolicy, Input, TimerKind};
pub use resolver::{StaticSource, StreamSource};
pub use retry::RetryConfig;
pub use session::{LiveSession, SessionCommand};
pub use state::{Phase, StatusReport, StreamState};

#[cfg(feature = "mmconfig")]
pub use config_ext::LiveConfigExt;
