//! HTTP client for the Ministry Media backend
//!
//! # Example
//!
//! ```no_run
//! use mmapi::{MinistryClient, VideoCategory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MinistryClient::builder()
//!         .base_url("https://api.ministry.example/api")
//!         .build()?;
//!
//!     for video in client.videos(VideoCategory::Sermons).await? {
//!         println!("{} - {}", video.title, video.video_url);
//!     }
//!     Ok(())
//! }
//! ```

use crate::auth::{MemoryTokenStore, TokenStore};
use crate::error::{Error, Result};
use crate::models::{
    thread_comments, ApiEnvelope, AuthSession, BibleBook, BibleChapter, ChannelStatus, Comment,
    Course, CourseVideo, DevicePlatform, DeviceRegistration, Enrollment, Event, EventRegistration,
    LoginRequest, NewComment, PrayerReceipt, PrayerRequest, Quote, RegistrationReceipt, Video,
    VideoCategory,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "https://api.ministry.example/api";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout of the channel-status probe used by the live screen
pub const STREAM_STATUS_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "MinistryMedia/0.1 (mmapi)";

/// Whether a request carries the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    None,
    Optional,
    Required,
}

/// Ministry Media backend client
///
/// Cheap to clone: the HTTP connection pool and the token store are shared.
#[derive(Debug, Clone)]
pub struct MinistryClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    tokens: Arc<dyn TokenStore>,
}

impl MinistryClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the global configuration
    ///
    /// The auth token is persisted in the configuration file.
    #[cfg(feature = "mmconfig")]
    pub fn from_config(config: std::sync::Arc<mmconfig::Config>) -> Result<Self> {
        use crate::config_ext::ApiConfigExt;

        Self::builder()
            .base_url(config.get_api_base_url()?)
            .timeout(Duration::from_secs(config.get_api_timeout_secs()?))
            .user_agent(config.get_api_user_agent()?)
            .token_store(Arc::new(crate::auth::ConfigTokenStore::new(config)))
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    // ========================================================================
    // Live stream
    // ========================================================================

    /// Current live stream URL
    ///
    /// Uses a short fixed timeout: the live screen retries on its own.
    /// An empty `stream_url` is reported as [`Error::MissingData`].
    pub async fn channel_status(&self) -> Result<ChannelStatus> {
        let url = self.endpoint(&["channel-status"])?;
        let request = self.client.get(url);
        let status: ChannelStatus = self
            .send_with_timeout(
                request,
                Auth::None,
                Duration::from_secs(STREAM_STATUS_TIMEOUT_SECS),
            )
            .await?;

        if status.stream_url.trim().is_empty() {
            return Err(Error::MissingData("stream_url".to_string()));
        }
        Ok(status)
    }

    // ========================================================================
    // Videos & quotes
    // ========================================================================

    /// Videos of one category, newest first as returned by the server
    pub async fn videos(&self, category: VideoCategory) -> Result<Vec<Video>> {
        self.get(&["videos"], &[("category", category.slug())], Auth::None)
            .await
    }

    /// A single video
    pub async fn video(&self, id: &str) -> Result<Video> {
        self.get(&["videos", id], &[], Auth::None).await
    }

    pub async fn quotes(&self) -> Result<Vec<Quote>> {
        self.get(&["quotes"], &[], Auth::None).await
    }

    /// Quote of the day
    pub async fn daily_quote(&self) -> Result<Quote> {
        self.get(&["quotes", "daily"], &[], Auth::None).await
    }

    // ========================================================================
    // Events & prayer
    // ========================================================================

    pub async fn events(&self) -> Result<Vec<Event>> {
        self.get(&["events"], &[], Auth::None).await
    }

    /// Register for an event
    ///
    /// The form is validated before anything is sent.
    pub async fn register_for_event(
        &self,
        event_id: &str,
        registration: &EventRegistration,
    ) -> Result<RegistrationReceipt> {
        registration.validate().map_err(Error::Invalid)?;
        self.post(&["events", event_id, "register"], registration, Auth::Optional)
            .await
    }

    /// Submit a prayer request
    pub async fn submit_prayer_request(&self, request: &PrayerRequest) -> Result<PrayerReceipt> {
        request.validate().map_err(Error::Invalid)?;
        self.post(&["prayer-requests"], request, Auth::Optional)
            .await
    }

    // ========================================================================
    // Bible reader
    // ========================================================================

    pub async fn bible_books(&self) -> Result<Vec<BibleBook>> {
        self.get(&["bible", "books"], &[], Auth::None).await
    }

    /// One chapter of a book (`book` is a [`BibleBook::id`])
    pub async fn bible_chapter(&self, book: &str, chapter: u32) -> Result<BibleChapter> {
        if chapter == 0 {
            return Err(Error::invalid("chapters start at 1"));
        }
        let chapter_str = chapter.to_string();
        self.get(&["bible", book, &chapter_str], &[], Auth::None)
            .await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Log in and keep the token for later calls
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::invalid("email and password are required"));
        }

        let session: AuthSession = self
            .post(
                &["auth", "login"],
                &LoginRequest {
                    email: email.trim(),
                    password,
                },
                Auth::None,
            )
            .await?;

        self.tokens.save(&session.token)?;
        debug!(user = %session.user.id, "Logged in");
        Ok(session)
    }

    /// Forget the local token and tell the server (best effort)
    pub async fn logout(&self) -> Result<()> {
        if self.tokens.load().is_some() {
            let url = self.endpoint(&["auth", "logout"])?;
            let request = self.client.post(url);
            if let Err(e) = self.send_ack(request, Auth::Optional).await {
                warn!("Server-side logout failed: {}", e);
            }
        }
        self.tokens.clear()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.load().is_some()
    }

    // ========================================================================
    // Mentorship
    // ========================================================================

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.get(&["courses"], &[], Auth::Optional).await
    }

    /// Enroll the logged-in user in a course
    pub async fn enroll(&self, course_id: &str) -> Result<Enrollment> {
        self.post(
            &["courses", course_id, "enroll"],
            &serde_json::json!({}),
            Auth::Required,
        )
        .await
    }

    pub async fn my_enrollments(&self) -> Result<Vec<Enrollment>> {
        self.get(&["me", "enrollments"], &[], Auth::Required).await
    }

    /// Lesson videos of a course, in course order
    pub async fn course_videos(&self, course_id: &str) -> Result<Vec<CourseVideo>> {
        let mut videos: Vec<CourseVideo> = self
            .get(&["courses", course_id, "videos"], &[], Auth::Required)
            .await?;
        videos.sort_by_key(|v| v.position);
        Ok(videos)
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Comment threads of a video
    pub async fn comments(&self, video_id: &str) -> Result<Vec<Comment>> {
        let flat: Vec<Comment> = self
            .get(&["videos", video_id, "comments"], &[], Auth::Optional)
            .await?;
        Ok(thread_comments(flat))
    }

    pub async fn post_comment(&self, video_id: &str, body: &str) -> Result<Comment> {
        let body = non_empty_body(body)?;
        self.post(
            &["videos", video_id, "comments"],
            &NewComment {
                body,
                parent_id: None,
            },
            Auth::Required,
        )
        .await
    }

    /// Reply to an existing comment
    pub async fn reply(&self, comment_id: &str, body: &str) -> Result<Comment> {
        let body = non_empty_body(body)?;
        self.post(
            &["comments", comment_id, "replies"],
            &NewComment {
                body,
                parent_id: Some(comment_id),
            },
            Auth::Required,
        )
        .await
    }

    // ========================================================================
    // Push notifications
    // ========================================================================

    /// Register the device push token
    pub async fn register_device(
        &self,
        push_token: &str,
        platform: DevicePlatform,
        install_id: &str,
    ) -> Result<()> {
        if push_token.trim().is_empty() {
            return Err(Error::invalid("push token is empty"));
        }
        let url = self.endpoint(&["devices"])?;
        let request = self.client.post(url).json(&DeviceRegistration {
            push_token: push_token.to_string(),
            platform,
            install_id: install_id.to_string(),
        });
        self.send_ack(request, Auth::Optional).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::invalid(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        auth: Auth,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let request = self.client.get(url).query(query);
        self.send(request, auth).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        auth: Auth,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let request = self.client.post(url).json(body);
        self.send(request, auth).await
    }

    fn authorize(&self, request: RequestBuilder, auth: Auth) -> Result<RequestBuilder> {
        match (auth, self.tokens.load()) {
            (Auth::None, _) => Ok(request),
            (_, Some(token)) => Ok(request.bearer_auth(token)),
            (Auth::Optional, None) => Ok(request),
            (Auth::Required, None) => Err(Error::NotAuthenticated),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, auth: Auth) -> Result<T> {
        self.send_with_timeout(request, auth, self.timeout).await
    }

    async fn send_with_timeout<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        auth: Auth,
        timeout: Duration,
    ) -> Result<T> {
        let response = self.dispatch(request, auth, timeout).await?;
        let envelope: ApiEnvelope<T> = self.handle_response(response, auth).await?;
        envelope
            .data
            .ok_or_else(|| Error::MissingData("data".to_string()))
    }

    async fn send_ack(&self, request: RequestBuilder, auth: Auth) -> Result<()> {
        let response = self.dispatch(request, auth, self.timeout).await?;
        let _: ApiEnvelope<serde_json::Value> = self.handle_response(response, auth).await?;
        Ok(())
    }

    /// Le timeout est appliqué ici une seule fois
    async fn dispatch(
        &self,
        request: RequestBuilder,
        auth: Auth,
        timeout: Duration,
    ) -> Result<Response> {
        let request = self.authorize(request.timeout(timeout), auth)?;
        Ok(request.send().await?)
    }

    /// Check the HTTP status and the envelope's `success` flag
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        auth: Auth,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status();
        let url = response.url().clone();
        debug!(%url, %status, "Backend response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Error::from_status(status.as_u16(), body);
            if auth != Auth::None && error.is_auth_error() {
                warn!("Auth token rejected by server, forgetting it");
                self.tokens.clear()?;
            }
            return Err(error);
        }

        let text = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            warn!(%url, "Malformed backend response: {}", e);
            Error::Json(e)
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request failed".to_string());
            return Err(Error::Rejected(message));
        }

        Ok(envelope)
    }
}

fn non_empty_body(body: &str) -> Result<&str> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        Err(Error::invalid("comment is empty"))
    } else {
        Ok(trimmed)
    }
}

/// Builder for configuring a MinistryClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    tokens: Option<Arc<dyn TokenStore>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            tokens: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set where the auth token is kept (in memory by default)
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<MinistryClient> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(MinistryClient {
            client,
            base_url,
            timeout: self.timeout,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
        })
    }
}
