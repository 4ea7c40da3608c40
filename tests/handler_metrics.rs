mod common;

use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;
use url_minifier::metrics::{RATE_LIMITED, describe_counters};

#[tokio::test]
async fn test_metrics_renders_prometheus_text() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::with_local_recorder(&recorder, || {
        describe_counters();
        metrics::counter!(RATE_LIMITED).increment(2);
    });

    let (state, _) = common::create_test_state(common::relaxed_limiter(), false);
    let server = common::create_test_server(state.with_metrics(handle));

    let response = server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.header("content-type").to_str().unwrap().starts_with("text/plain"));
    assert!(response.text().contains("rate_limited_total 2"));
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let (state, _) = common::create_test_state(common::relaxed_limiter(), false);
    let server = common::create_test_server(state);

    let response = server.get("/metrics").await;

    response.assert_status(StatusCode::NOT_FOUND);
}
