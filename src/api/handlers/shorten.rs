//! Handler for the shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or returns the existing) short URL for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// `201 Created`, also when the URL was already shortened:
///
/// ```json
/// { "short_url": "http://localhost:3000/K9x2LmQ4ab" }
/// ```
///
/// # Errors
///
/// - 400 if the body is not valid JSON or the URL is not an absolute http(s) URL
/// - 503 if no free code could be allocated
/// - 500 on store failures
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request payload",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let code = state.url_service.create_short_url(&payload.long_url).await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_url: state.short_url(&code),
        }),
    ))
}
