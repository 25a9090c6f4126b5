//! Integration tests for `CsvClient::fetch_csv`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrina_feed::{CsvClient, FeedError};

/// Builds a `CsvClient` suitable for tests: 5-second timeout, descriptive UA, no retries.
fn test_client() -> CsvClient {
    CsvClient::new(5, "vitrina-test/0.1", 0, 0).expect("failed to build test CsvClient")
}

fn catalog_url(server: &MockServer) -> String {
    format!("{}/pub", server.uri())
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_csv_parses_rows_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .and(header("user-agent", "vitrina-test/0.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Categoria,Modelo\nCelulares,iPhone 13\nAudio,Flip 6\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let parsed = test_client()
        .fetch_csv(&catalog_url(&server))
        .await
        .expect("fetch should succeed");

    assert!(parsed.errors.is_empty(), "errors: {:?}", parsed.errors);
    assert_eq!(parsed.headers, vec!["Categoria", "Modelo"]);
    assert_eq!(parsed.rows.len(), 2);
    assert_eq!(parsed.rows[1].field("Modelo").unwrap(), "Flip 6");
}

#[tokio::test]
async fn fetch_csv_returns_structural_errors_without_failing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("Categoria,Modelo\nAudio,Flip 6,extra\n"),
        )
        .mount(&server)
        .await;

    let parsed = test_client()
        .fetch_csv(&catalog_url(&server))
        .await
        .expect("structural errors are not transport errors");

    assert_eq!(parsed.errors.len(), 1);
    assert!(parsed.rows.is_empty());
}

// ---------------------------------------------------------------------------
// Status handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_csv_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client().fetch_csv(&catalog_url(&server)).await;

    match result {
        Err(FeedError::NotFound { url }) => assert!(url.ends_with("/pub")),
        other => panic!("expected FeedError::NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_csv_maps_other_statuses_to_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_client().fetch_csv(&catalog_url(&server)).await;

    assert!(
        matches!(result, Err(FeedError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus 503, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_csv_propagates_rate_limit_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let result = test_client().fetch_csv(&catalog_url(&server)).await;

    match result {
        Err(FeedError::RateLimited {
            retry_after_secs, ..
        }) => assert_eq!(retry_after_secs, Some(30)),
        other => panic!("expected FeedError::RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_csv_rejects_invalid_url_without_request() {
    let result = test_client().fetch_csv("not a url").await;
    assert!(matches!(result, Err(FeedError::InvalidUrl { .. })));
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_csv_retries_after_rate_limit_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Modelo\nFlip 6\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CsvClient::new(5, "vitrina-test/0.1", 2, 0).expect("client");
    let parsed = client
        .fetch_csv(&catalog_url(&server))
        .await
        .expect("second attempt should succeed");

    assert_eq!(parsed.rows.len(), 1);
}

#[tokio::test]
async fn fetch_csv_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Modelo\nFlip 6\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CsvClient::new(5, "vitrina-test/0.1", 2, 0).expect("client");
    let parsed = client
        .fetch_csv(&catalog_url(&server))
        .await
        .expect("third attempt should succeed");

    assert_eq!(parsed.rows.len(), 1);
}

#[tokio::test]
async fn fetch_csv_rate_limit_without_retry_after_uses_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let client = CsvClient::new(5, "vitrina-test/0.1", 1, 0).expect("client");
    let result = client.fetch_csv(&catalog_url(&server)).await;

    assert!(
        matches!(
            result,
            Err(FeedError::RateLimited {
                retry_after_secs: None,
                ..
            })
        ),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_csv_does_not_retry_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = CsvClient::new(5, "vitrina-test/0.1", 3, 0).expect("client");
    let result = client.fetch_csv(&catalog_url(&server)).await;

    assert!(matches!(result, Err(FeedError::NotFound { .. })));
}
