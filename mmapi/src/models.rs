//! Data models for the Ministry Media backend
//!
//! Every endpoint answers with the same envelope
//! (`{ "success": bool, "data": ..., "message": ... }`). The payload types
//! below are validated at deserialization time; anything that does not
//! match is reported as an error by the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Envelope
// ============================================================================

/// Response envelope shared by all backend endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Identifiers are strings on some endpoints and integers on others
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
    }

    match Id::deserialize(deserializer)? {
        Id::Str(s) => Ok(s),
        Id::Int(n) => Ok(n.to_string()),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Str(s)) => Some(s),
        Some(Id::Int(n)) => Some(n.to_string()),
        None => None,
    })
}

// ============================================================================
// Live stream
// ============================================================================

/// Payload of `GET /channel-status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelStatus {
    pub stream_url: String,
}

// ============================================================================
// Videos
// ============================================================================

/// Video categories exposed by the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCategory {
    Sermons,
    Prophecy,
    Testimonies,
    Worship,
    Teachings,
    Healing,
    Deliverance,
}

impl VideoCategory {
    pub const ALL: [VideoCategory; 7] = [
        Self::Sermons,
        Self::Prophecy,
        Self::Testimonies,
        Self::Worship,
        Self::Teachings,
        Self::Healing,
        Self::Deliverance,
    ];

    /// Path segment used by the backend
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Sermons => "sermons",
            Self::Prophecy => "prophecy",
            Self::Testimonies => "testimonies",
            Self::Worship => "worship",
            Self::Teachings => "teachings",
            Self::Healing => "healing",
            Self::Deliverance => "deliverance",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Sermons => "Sermons",
            Self::Prophecy => "Prophecy",
            Self::Testimonies => "Testimonies",
            Self::Worship => "Worship",
            Self::Teachings => "Teachings",
            Self::Healing => "Healing",
            Self::Deliverance => "Deliverance",
        }
    }
}

impl fmt::Display for VideoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for VideoCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        // "sermon" et "sermons" sont tous deux acceptés
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == wanted || c.slug().trim_end_matches('s') == wanted)
            .ok_or_else(|| format!("unknown video category: {}", s))
    }
}

/// A catalogue video (hosted on YouTube)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Watch URL or bare YouTube id
    #[serde(alias = "youtube_url", alias = "video_id")]
    pub video_url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category: Option<VideoCategory>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Quotes
// ============================================================================

/// Inspirational quote / verse of the day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Scripture reference ("John 3:16")
    #[serde(default)]
    pub reference: Option<String>,
}

// ============================================================================
// Events
// ============================================================================

/// A church event open for registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub registration_open: bool,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Event {
    /// True when the event has not started yet at `now`
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.starts_at > now
    }
}

/// Registration form for an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRegistration {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub attendees: u32,
}

impl EventRegistration {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            attendees: 1,
        }
    }

    /// Check the form before sending it
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("full name is required".to_string());
        }
        if !looks_like_email(&self.email) {
            return Err(format!("invalid email address: {}", self.email));
        }
        if self.attendees == 0 {
            return Err("at least one attendee is required".to_string());
        }
        Ok(())
    }
}

/// Server acknowledgement of an event registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationReceipt {
    #[serde(deserialize_with = "string_or_number")]
    pub registration_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub event_id: String,
}

// ============================================================================
// Prayer requests
// ============================================================================

/// A prayer request submitted by a visitor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrayerRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub request: String,
    /// Only the prayer team sees private requests
    #[serde(default)]
    pub is_private: bool,
}

impl PrayerRequest {
    pub fn new(name: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            request: request.into(),
            is_private: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.request.trim().is_empty() {
            return Err("prayer request is empty".to_string());
        }
        if let Some(email) = &self.email {
            if !looks_like_email(email) {
                return Err(format!("invalid email address: {}", email));
            }
        }
        Ok(())
    }
}

/// Server acknowledgement of a prayer request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrayerReceipt {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

// ============================================================================
// Bible
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

/// A book of the Bible as listed by the reader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BibleBook {
    /// Identifier used in chapter requests ("john", "1corinthians")
    pub id: String,
    pub name: String,
    pub chapters: u32,
    #[serde(default)]
    pub testament: Option<Testament>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verse {
    #[serde(alias = "verse")]
    pub number: u32,
    pub text: String,
}

/// One chapter of a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BibleChapter {
    pub book: String,
    pub chapter: u32,
    pub verses: Vec<Verse>,
}

impl BibleChapter {
    /// Verses `from..=to`, clamped to the chapter
    pub fn passage(&self, from: u32, to: u32) -> impl Iterator<Item = &Verse> {
        self.verses
            .iter()
            .filter(move |v| v.number >= from && v.number <= to)
    }
}

// ============================================================================
// Authentication & mentorship
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// A mentorship course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mentor: Option<String>,
    #[serde(default)]
    pub lessons: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
    /// Completed lessons
    #[serde(default)]
    pub progress: u32,
}

/// A lesson video inside a course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseVideo {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(alias = "youtube_url")]
    pub video_url: String,
    #[serde(default)]
    pub position: u32,
}

// ============================================================================
// Comments
// ============================================================================

/// A comment on a course video; replies are nested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewComment<'a> {
    pub body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
}

/// Build reply threads out of a flat comment list
///
/// The backend returns either a flat list with `parent_id` or already
/// nested replies; both shapes end up nested. Roots and replies are sorted
/// by creation date, and replies whose parent is missing are promoted to
/// roots so nothing is lost.
pub fn thread_comments(flat: Vec<Comment>) -> Vec<Comment> {
    let ids: std::collections::HashSet<String> = flat.iter().map(|c| c.id.clone()).collect();

    let mut children: HashMap<String, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in flat {
        match comment.parent_id.clone() {
            Some(parent) if ids.contains(&parent) && parent != comment.id => {
                children.entry(parent).or_default().push(comment)
            }
            _ => roots.push(comment),
        }
    }

    fn attach(mut comment: Comment, children: &mut HashMap<String, Vec<Comment>>) -> Comment {
        if let Some(mut replies) = children.remove(&comment.id) {
            replies.sort_by_key(|c| c.created_at);
            let nested: Vec<Comment> = replies.into_iter().map(|r| attach(r, children)).collect();
            comment.replies.extend(nested);
        }
        comment.replies.sort_by_key(|c| c.created_at);
        comment
    }

    roots.sort_by_key(|c| c.created_at);
    let mut threaded: Vec<Comment> = roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect();

    // Cycles leave entries behind; surface them as roots.
    let mut leftovers: Vec<Comment> = children.into_values().flatten().collect();
    leftovers.sort_by_key(|c| c.created_at);
    threaded.extend(leftovers);
    threaded
}

// ============================================================================
// Push notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlatform {
    Android,
    Ios,
    Web,
}

impl FromStr for DevicePlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "web" => Ok(Self::Web),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceRegistration {
    pub push_token: String,
    pub platform: DevicePlatform,
    pub install_id: String,
}
