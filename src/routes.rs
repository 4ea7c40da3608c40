//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`     - Create a short URL
//! - `GET  /urls`        - Paginated listing
//! - `GET  /healthcheck` - Store connectivity
//! - `GET  /metrics`     - Prometheus counters
//! - `GET  /{code}`      - Short link redirect
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Admission control** - Per-client fixed window, applied to every route
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Client identity for admission control comes from `ConnectInfo` when the
/// server is started with `into_make_service_with_connect_info`, and from
/// `X-Forwarded-For` when [`AppState::behind_proxy`] is set.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = api::routes::public_routes()
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
