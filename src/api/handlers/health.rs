//! Handler for health check endpoint.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Deadline for the store ping.
pub const HEALTH_DEADLINE: Duration = Duration::from_secs(1);

/// Reports whether the store answers.
///
/// # Endpoint
///
/// `GET /healthcheck`
///
/// # Response Codes
///
/// - **200 OK**: `{"status":"Up","db_status":"ok"}`
/// - **503 Service Unavailable**: `{"status":"Down","db_status":"connection failed","error":"..."}`
///
/// The store ping is abandoned after one second.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match state.url_service.health_check(HEALTH_DEADLINE).await {
        Ok(()) => Ok(Json(HealthResponse::up())),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::down(e.to_string())),
            ))
        }
    }
}
