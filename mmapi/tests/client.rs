//! Integration tests for mmapi

use mmapi::{
    preload_home_feed, DevicePlatform, Error, EventRegistration, MemoryTokenStore, MinistryClient,
    PrayerRequest, VideoCategory,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MinistryClient {
    MinistryClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .build()
        .unwrap()
}

fn logged_in_client(server: &MockServer) -> MinistryClient {
    MinistryClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .token_store(Arc::new(MemoryTokenStore::with_token("tok-1")))
        .build()
        .unwrap()
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn sermon_json(id: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "youtube_url": format!("https://www.youtube.com/watch?v=abcdefghij{}", id),
        "category": "sermons",
        "speaker": "Pastor John"
    })
}

#[tokio::test]
async fn test_channel_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/channel-status"))
        .respond_with(ok(json!({ "stream_url": "https://live.example/a.m3u8" })))
        .mount(&server)
        .await;

    let status = client_for(&server).channel_status().await.unwrap();
    assert_eq!(status.stream_url, "https://live.example/a.m3u8");
}

#[tokio::test]
async fn test_channel_status_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/channel-status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "stream offline" })),
        )
        .mount(&server)
        .await;

    match client_for(&server).channel_status().await {
        Err(Error::Rejected(msg)) => assert_eq!(msg, "stream offline"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_channel_status_empty_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/channel-status"))
        .respond_with(ok(json!({ "stream_url": "  " })))
        .mount(&server)
        .await;

    assert!(matches!(
        client_for(&server).channel_status().await,
        Err(Error::MissingData(_))
    ));
}

#[tokio::test]
async fn test_channel_status_times_out_after_ten_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/channel-status"))
        .respond_with(
            ok(json!({ "stream_url": "https://live.example/a.m3u8" }))
                .set_delay(std::time::Duration::from_secs(13)),
        )
        .mount(&server)
        .await;

    // Le timeout général (30 s) ne doit pas s'appliquer ici
    let started = std::time::Instant::now();
    let result = client_for(&server).channel_status().await;
    let elapsed = started.elapsed();

    match result {
        Err(e) => assert!(e.is_network(), "unexpected error: {:?}", e),
        Ok(status) => panic!("hanging backend reported online: {:?}", status),
    }
    assert!(elapsed < std::time::Duration::from_secs(12), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_videos_by_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos"))
        .and(query_param("category", "sermons"))
        .respond_with(ok(json!([
            sermon_json(1, "Walking by Faith"),
            sermon_json(2, "The Good Shepherd")
        ])))
        .mount(&server)
        .await;

    let videos = client_for(&server)
        .videos(VideoCategory::Sermons)
        .await
        .unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].id, "1");
    assert_eq!(videos[1].title, "The Good Shepherd");
    assert_eq!(videos[0].category, Some(VideoCategory::Sermons));
}

#[tokio::test]
async fn test_server_error_is_not_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    match client_for(&server).events().await {
        Err(Error::Api { code, message }) => {
            assert_eq!(code, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/quotes/daily"))
        .respond_with(ok(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    assert!(matches!(
        client_for(&server).daily_quote().await,
        Err(Error::Json(_))
    ));
}

#[tokio::test]
async fn test_register_for_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/7/register"))
        .and(body_partial_json(json!({ "full_name": "Mary", "attendees": 2 })))
        .respond_with(ok(json!({ "registration_id": 99, "event_id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = EventRegistration::new("Mary", "mary@example.org");
    form.attendees = 2;
    let receipt = client_for(&server)
        .register_for_event("7", &form)
        .await
        .unwrap();
    assert_eq!(receipt.registration_id, "99");
    assert_eq!(receipt.event_id, "7");
}

#[tokio::test]
async fn test_invalid_prayer_request_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({ "id": 1 })))
        .expect(0)
        .mount(&server)
        .await;

    let request = PrayerRequest::new("Paul", "   ");
    assert!(matches!(
        client_for(&server).submit_prayer_request(&request).await,
        Err(Error::Invalid(_))
    ));
}

#[tokio::test]
async fn test_bible_chapter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bible/john/3"))
        .respond_with(ok(json!({
            "book": "John",
            "chapter": 3,
            "verses": [
                { "verse": 16, "text": "For God so loved the world..." },
                { "verse": 17, "text": "For God sent not his Son..." }
            ]
        })))
        .mount(&server)
        .await;

    let chapter = client_for(&server).bible_chapter("john", 3).await.unwrap();
    assert_eq!(chapter.verses.len(), 2);
    assert_eq!(chapter.passage(16, 16).count(), 1);
}

#[tokio::test]
async fn test_login_stores_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({ "email": "grace@example.org" })))
        .respond_with(ok(json!({
            "token": "tok-42",
            "user": { "id": 5, "name": "Grace", "email": "grace@example.org" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/me/enrollments"))
        .and(header("Authorization", "Bearer tok-42"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.is_authenticated());

    let session = client.login("grace@example.org", "secret").await.unwrap();
    assert_eq!(session.user.id, "5");
    assert!(client.is_authenticated());

    let enrollments = client.my_enrollments().await.unwrap();
    assert!(enrollments.is_empty());
}

#[tokio::test]
async fn test_enroll_requires_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        client_for(&server).enroll("3").await,
        Err(Error::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_rejected_token_is_forgotten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me/enrollments"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let client = logged_in_client(&server);
    assert!(client.is_authenticated());

    let err = client.my_enrollments().await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_course_videos_sorted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses/3/videos"))
        .respond_with(ok(json!([
            { "id": "b", "title": "Lesson 2", "video_url": "vid2", "position": 2 },
            { "id": "a", "title": "Lesson 1", "video_url": "vid1", "position": 1 }
        ])))
        .mount(&server)
        .await;

    let videos = logged_in_client(&server)
        .course_videos("3")
        .await
        .unwrap();
    assert_eq!(videos[0].title, "Lesson 1");
    assert_eq!(videos[1].title, "Lesson 2");
}

#[tokio::test]
async fn test_comments_are_threaded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/12/comments"))
        .respond_with(ok(json!([
            { "id": 1, "author": "Ann", "body": "Amen", "created_at": "2026-03-01T10:00:00Z" },
            { "id": 2, "author": "Ben", "body": "Indeed", "created_at": "2026-03-01T10:05:00Z", "parent_id": 1 },
            { "id": 3, "author": "Cid", "body": "Blessed", "created_at": "2026-03-01T10:02:00Z" }
        ])))
        .mount(&server)
        .await;

    let threads = client_for(&server).comments("12").await.unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].id, "1");
    assert_eq!(threads[0].replies.len(), 1);
    assert_eq!(threads[0].replies[0].author, "Ben");
}

#[tokio::test]
async fn test_reply_sends_parent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/comments/1/replies"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({ "body": "Thank you", "parent_id": "1" })))
        .respond_with(ok(json!({
            "id": 4, "author": "Me", "body": "Thank you",
            "created_at": "2026-03-01T11:00:00Z", "parent_id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let comment = logged_in_client(&server)
        .reply("1", "  Thank you ")
        .await
        .unwrap();
    assert_eq!(comment.parent_id.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_register_device() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .and(body_partial_json(json!({
            "push_token": "push-abc",
            "platform": "android",
            "install_id": "install-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .register_device("push-abc", DevicePlatform::Android, "install-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_home_feed_degrades_per_section() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/quotes/daily"))
        .respond_with(ok(json!({ "id": 1, "text": "Be still", "reference": "Psalm 46:10" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/videos"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ok(json!([
            { "id": 1, "title": "Past", "starts_at": "2000-01-01T10:00:00Z" },
            { "id": 2, "title": "Crusade", "starts_at": "2999-06-01T18:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let feed = preload_home_feed(&client_for(&server)).await;
    assert_eq!(feed.daily_quote.map(|q| q.text).as_deref(), Some("Be still"));
    assert!(feed.latest_sermons.is_empty());
    assert_eq!(feed.upcoming_events.len(), 1);
    assert_eq!(feed.upcoming_events[0].title, "Crusade");
}
