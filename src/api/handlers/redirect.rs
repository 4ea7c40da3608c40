//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Every successful resolution increments the record's click count in the
/// same store call that reads the long URL.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.url_service.get_long_url(&code).await?;

    tracing::debug!(code = %code, long_url = %long_url, "Redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]))
}
