//! Per-client admission control in front of every route.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::metrics::RATE_LIMITED;
use crate::state::AppState;
use crate::utils::client_identity::client_identity;

/// Admits or rejects a request using the shared [`crate::domain::rate_limiter::RateLimiter`].
///
/// The client is identified by its peer address, or by the first
/// `X-Forwarded-For` entry when [`AppState::behind_proxy`] is set. That header
/// is client-controlled, so only trust it behind a proxy that overwrites it.
///
/// # Errors
///
/// Returns `429 Too Many Requests` with a `Retry-After` header once the
/// client's window is full.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let client = client_identity(req.headers(), peer, st.behind_proxy);

    if !st.rate_limiter.admit(&client) {
        metrics::counter!(RATE_LIMITED).increment(1);
        tracing::warn!(
            client = %client,
            limit = st.rate_limiter.max_requests(),
            path = %req.uri().path(),
            "Rate limit exceeded"
        );
        return Err(AppError::too_many_requests(
            st.rate_limiter.retry_after_secs(),
        ));
    }

    Ok(next.run(req).await)
}
