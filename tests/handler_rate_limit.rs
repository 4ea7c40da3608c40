mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url_minifier::domain::rate_limiter::RateLimiter;

fn forwarded_for() -> HeaderName {
    HeaderName::from_static("x-forwarded-for")
}

#[tokio::test]
async fn test_requests_over_limit_are_rejected() {
    let (state, _repo) =
        common::create_test_state(RateLimiter::new(3, Duration::from_secs(60)), false);
    let server = common::create_test_server(state);

    for _ in 0..3 {
        server.get("/healthcheck").await.assert_status_ok();
    }

    let response = server.get("/healthcheck").await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("retry-after"), "60");

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "rate_limited");
    assert_eq!(body["error"]["details"]["retry_after_secs"], 60);
}

#[tokio::test]
async fn test_default_limit_is_twenty() {
    let (state, _repo) = common::create_test_state(RateLimiter::default(), false);
    let server = common::create_test_server(state);

    for i in 1..=20 {
        let response = server.get("/nonexistent").await;
        assert_eq!(
            response.status_code(),
            StatusCode::NOT_FOUND,
            "request {i} should pass the limiter"
        );
    }

    server
        .get("/nonexistent")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_peers_are_limited_independently() {
    let (state, _repo) =
        common::create_test_state(RateLimiter::new(1, Duration::from_secs(60)), false);

    let first = common::create_test_server_from(state.clone(), "10.0.0.1:5000");
    let second = common::create_test_server_from(state, "10.0.0.2:5000");

    first.get("/healthcheck").await.assert_status_ok();
    first
        .get("/healthcheck")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    second.get("/healthcheck").await.assert_status_ok();
}

#[tokio::test]
async fn test_forwarded_for_ignored_without_proxy() {
    let (state, _repo) =
        common::create_test_state(RateLimiter::new(1, Duration::from_secs(60)), false);
    let server = common::create_test_server(state);

    server
        .get("/healthcheck")
        .add_header(forwarded_for(), HeaderValue::from_static("1.1.1.1"))
        .await
        .assert_status_ok();

    server
        .get("/healthcheck")
        .add_header(forwarded_for(), HeaderValue::from_static("2.2.2.2"))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_trusted_behind_proxy() {
    let (state, _repo) =
        common::create_test_state(RateLimiter::new(1, Duration::from_secs(60)), true);
    let server = common::create_test_server(state);

    server
        .get("/healthcheck")
        .add_header(forwarded_for(), HeaderValue::from_static("1.1.1.1, 10.0.0.1"))
        .await
        .assert_status_ok();

    server
        .get("/healthcheck")
        .add_header(forwarded_for(), HeaderValue::from_static("2.2.2.2"))
        .await
        .assert_status_ok();

    server
        .get("/healthcheck")
        .add_header(forwarded_for(), HeaderValue::from_static("1.1.1.1"))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
