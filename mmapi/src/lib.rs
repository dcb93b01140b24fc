//! # mmapi - Ministry Media backend client
//!
//! Typed async client for the ministry backend: live channel status,
//! video catalogue, quotes, events, prayer requests, Bible reader,
//! mentorship courses, comments and push-device registration.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mmapi::MinistryClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MinistryClient::builder().build()?;
//!
//!     let quote = client.daily_quote().await?;
//!     println!("{}", quote.text);
//!
//!     let status = client.channel_status().await?;
//!     println!("Live: {}", status.stream_url);
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! `login` stores the bearer token in the client's [`TokenStore`]. With the
//! `mmconfig` feature (default), [`MinistryClient::from_config`] persists it
//! encrypted in the configuration file.
//!
//! ## Errors
//!
//! Every call returns [`Result`]: transport failures, non-2xx statuses,
//! `success: false` envelopes and missing payloads are all distinct
//! [`Error`] variants. Nothing silently becomes an empty list.

pub mod auth;
pub mod bootstrap;
pub mod client;
pub mod error;
pub mod models;

#[cfg(feature = "mmconfig")]
pub mod config_ext;

pub use auth::{MemoryTokenStore, TokenStore};
pub use bootstrap::{preload_home_feed, BootstrapContext, HomeFeed};
pub use client::{ClientBuilder, MinistryClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use models::{
    AuthSession, BibleBook, BibleChapter, ChannelStatus, Comment, Course, CourseVideo,
    DevicePlatform, Enrollment, Event, EventRegistration, PrayerReceipt, PrayerRequest, Quote,
    RegistrationReceipt, Testament, UserProfile, Verse, Video, VideoCategory,
};

#[cfg(feature = "mmconfig")]
pub use auth::ConfigTokenStore;
#[cfg(feature = "mmconfig")]
pub use config_ext::ApiConfigExt;
