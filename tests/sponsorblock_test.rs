//! Skip-segment client tests against a mock service.

use tubeforge::config::SponsorBlockConfig;
use tubeforge::error::Error;
use tubeforge::sponsorblock::SponsorBlockClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SponsorBlockClient {
    SponsorBlockClient::new(&SponsorBlockConfig {
        enabled: true,
        api_url: server.uri(),
        category: "music_offtopic".to_string(),
    })
}

#[tokio::test]
async fn fetches_and_decodes_segments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/skipSegments"))
        .and(query_param("videoID", "abc123"))
        .and(query_param("category", "music_offtopic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"segment": [1.5, 3.0], "UUID": "x", "category": "music_offtopic"},
            {"segment": [10, 20]},
        ])))
        .mount(&server)
        .await;

    let segments = client_for(&server)
        .fetch_skip_segments("abc123")
        .await
        .unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].start, 1.5);
    assert_eq!(segments[0].end, 3.0);
    assert_eq!(segments[1].start, 10.0);
    assert_eq!(segments[1].end, 20.0);
}

#[tokio::test]
async fn decodes_capitalized_field_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/skipSegments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"Segment": [0.0, 4.5]}])),
        )
        .mount(&server)
        .await;

    let segments = client_for(&server)
        .fetch_skip_segments("abc123")
        .await
        .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].end, 4.5);
}

#[tokio::test]
async fn non_success_status_means_no_segments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/skipSegments"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let segments = client_for(&server)
        .fetch_skip_segments("abc123")
        .await
        .unwrap();

    assert!(segments.is_empty());
}

#[tokio::test]
async fn unreachable_service_means_no_segments() {
    let client = SponsorBlockClient::new(&SponsorBlockConfig {
        enabled: true,
        // Nothing listens here.
        api_url: "http://127.0.0.1:1".to_string(),
        category: "music_offtopic".to_string(),
    });

    let segments = client.fetch_skip_segments("abc123").await.unwrap();
    assert!(segments.is_empty());
}

#[tokio::test]
async fn short_segment_array_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/skipSegments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"segment": [7.0]}])),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_skip_segments("abc123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().contains("expected 2"));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/skipSegments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_skip_segments("abc123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
}
