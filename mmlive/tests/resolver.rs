//! Stream URL resolution against a mock backend

use mmapi::MinistryClient;
use mmlive::{StreamError, StreamSource};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn source_answering(template: ResponseTemplate) -> (MockServer, MinistryClient) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/channel-status"))
        .respond_with(template)
        .mount(&server)
        .await;

    let client = MinistryClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .build()
        .unwrap();
    (server, client)
}

#[tokio::test]
async fn test_stream_url_found() {
    let (_server, client) = source_answering(ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": { "stream_url": "https://x/live.m3u8" }
    })))
    .await;

    assert_eq!(client.fetch_stream_url().await.unwrap(), "https://x/live.m3u8");
}

#[tokio::test]
async fn test_offline_is_network_failure() {
    let (_server, client) = source_answering(
        ResponseTemplate::new(200).set_body_json(json!({ "success": false })),
    )
    .await;

    assert!(matches!(
        client.fetch_stream_url().await,
        Err(StreamError::NetworkFailure(_))
    ));
}

#[tokio::test]
async fn test_http_error_is_network_failure() {
    let (_server, client) = source_answering(ResponseTemplate::new(502)).await;

    assert!(matches!(
        client.fetch_stream_url().await,
        Err(StreamError::NetworkFailure(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_is_network_failure() {
    let (_server, client) =
        source_answering(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    assert!(matches!(
        client.fetch_stream_url().await,
        Err(StreamError::NetworkFailure(_))
    ));
}

#[tokio::test]
async fn test_empty_url_is_network_failure() {
    let (_server, client) = source_answering(ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": { "stream_url": "" }
    })))
    .await;

    assert!(client.fetch_stream_url().await.is_err());
}
