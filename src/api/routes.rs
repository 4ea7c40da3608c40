//! API route configuration.

use crate::api::handlers::{
    health_handler, list_urls_handler, metrics_handler, redirect_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All public routes.
///
/// # Endpoints
///
/// - `POST /shorten`      - Create or fetch the short URL for a long URL
/// - `GET  /urls`         - Paginated listing
/// - `GET  /healthcheck`  - Store connectivity
/// - `GET  /metrics`      - Prometheus counters
/// - `GET  /{code}`       - Redirect to the long URL
///
/// The static routes take priority over `/{code}`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls", get(list_urls_handler))
        .route("/healthcheck", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/{code}", get(redirect_handler))
}
