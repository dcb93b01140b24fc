//! Data prefetched at startup
//!
//! The splash screen loads the home feed while the app starts, then hands
//! it to the home screen exactly once through a [`BootstrapContext`].

use crate::client::MinistryClient;
use crate::error::{Error, Result};
use crate::models::{Event, Quote, Video, VideoCategory};
use chrono::Utc;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Number of latest sermons shown on the home screen
pub const HOME_SERMON_COUNT: usize = 6;

/// One-shot handoff slot
///
/// `set` succeeds once; a second `set` before `clear` is an error so two
/// concurrent bootstraps are detected. `take` hands the value out once.
#[derive(Debug)]
pub struct BootstrapContext<T> {
    slot: Mutex<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    filled: bool,
    value: Option<T>,
}

impl<T> Default for BootstrapContext<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(Slot {
                filled: false,
                value: None,
            }),
        }
    }
}

impl<T> BootstrapContext<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot<T>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store the prefetched value
    pub fn set(&self, value: T) -> Result<()> {
        let mut slot = self.lock();
        if slot.filled {
            return Err(Error::Bootstrap("context already set".to_string()));
        }
        slot.filled = true;
        slot.value = Some(value);
        Ok(())
    }

    /// Take the value; later calls return `None` until the next `set`
    pub fn take(&self) -> Option<T> {
        self.lock().value.take()
    }

    /// True if `set` was called since the last `clear`
    pub fn is_set(&self) -> bool {
        self.lock().filled
    }

    /// Reset the slot (next app start)
    pub fn clear(&self) {
        let mut slot = self.lock();
        slot.filled = false;
        slot.value = None;
    }
}

/// What the home screen shows
#[derive(Debug, Clone, Default)]
pub struct HomeFeed {
    pub daily_quote: Option<Quote>,
    pub latest_sermons: Vec<Video>,
    pub upcoming_events: Vec<Event>,
}

impl HomeFeed {
    pub fn is_empty(&self) -> bool {
        self.daily_quote.is_none() && self.latest_sermons.is_empty() && self.upcoming_events.is_empty()
    }
}

/// Fetch the home feed concurrently
///
/// Each section degrades independently: a failing endpoint is logged and
/// its section left empty.
pub async fn preload_home_feed(client: &MinistryClient) -> HomeFeed {
    let (quote, sermons, events) = tokio::join!(
        client.daily_quote(),
        client.videos(VideoCategory::Sermons),
        client.events(),
    );

    let daily_quote = quote
        .map_err(|e| warn!("Home feed: daily quote unavailable: {}", e))
        .ok();

    let latest_sermons = match sermons {
        Ok(mut videos) => {
            videos.truncate(HOME_SERMON_COUNT);
            videos
        }
        Err(e) => {
            warn!("Home feed: sermons unavailable: {}", e);
            Vec::new()
        }
    };

    let now = Utc::now();
    let upcoming_events = match events {
        Ok(events) => {
            let mut upcoming: Vec<Event> =
                events.into_iter().filter(|e| e.is_upcoming(now)).collect();
            upcoming.sort_by_key(|e| e.starts_at);
            upcoming
        }
        Err(e) => {
            warn!("Home feed: events unavailable: {}", e);
            Vec::new()
        }
    };

    debug!(
        quote = daily_quote.is_some(),
        sermons = latest_sermons.len(),
        events = upcoming_events.len(),
        "Home feed preloaded"
    );

    HomeFeed {
        daily_quote,
        latest_sermons,
        upcoming_events,
    }
}
