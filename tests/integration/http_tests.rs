//! Retry, 404 and timeout behaviour of the shared HTTP client

use std::time::Duration;

use ra_transcripts::config::HttpConfig;
use ra_transcripts::{HttpClient, RaError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(max_retries: u32) -> HttpConfig {
    HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        max_retries,
        backoff_base_ms: 10,
        user_agent: "ra-transcripts-tests".to_string(),
    }
}

#[tokio::test]
async fn test_retries_transient_errors_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&fast_config(3)).unwrap();
    let body = client
        .get(&format!("{}/flaky", server.uri()), &[], &[])
        .await
        .unwrap();

    assert_eq!(body, b"ok");
    let stats = client.stats();
    assert_eq!(stats.requests, 3);
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.successes, 1);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let client = HttpClient::new(&fast_config(2)).unwrap();
    let error = client
        .get(&format!("{}/down", server.uri()), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(error, RaError::Status { status: 502, .. }));
    assert_eq!(client.stats().retries, 2);
    assert_eq!(client.stats().errors, 1);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&fast_config(3)).unwrap();
    let error = client
        .get(&format!("{}/bad", server.uri()), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(error, RaError::Status { status: 400, .. }));
    assert_eq!(client.stats().retries, 0);
}

#[tokio::test]
async fn test_optional_get_treats_404_as_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&fast_config(3)).unwrap();
    let body = client
        .get_optional(&format!("{}/missing", server.uri()), &[])
        .await
        .unwrap();

    assert!(body.is_none());
    let stats = client.stats();
    assert_eq!(stats.retries, 0);
    assert_eq!(stats.not_found, 1);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_required_get_reports_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&fast_config(3)).unwrap();
    let error = client
        .get(&format!("{}/missing", server.uri()), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(error, RaError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = HttpConfig {
        timeout_secs: 1,
        ..fast_config(0)
    };
    let client = HttpClient::new(&config).unwrap();
    let error = client
        .get(&format!("{}/slow", server.uri()), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(error, RaError::Timeout { .. }));
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(wiremock::matchers::query_param("q", "a b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"n": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&fast_config(0)).unwrap();
    let value: serde_json::Value = client
        .get_json(&format!("{}/api", server.uri()), &[("q", "a b".to_string())])
        .await
        .unwrap();

    assert_eq!(value["n"], 1);
}
