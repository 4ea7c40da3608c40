//! Handler for the Prometheus scrape endpoint.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders every counter in the Prometheus text format.
///
/// # Endpoint
///
/// `GET /metrics`
///
/// # Response Codes
///
/// - **200 OK**: Prometheus exposition text
/// - **404 Not Found**: No recorder installed
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::not_found("Metrics are not enabled", json!({})))?;

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], handle.render()).into_response())
}
