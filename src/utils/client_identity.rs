//! Client identity extraction for admission control.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity used when neither a forwarded address nor a peer address exists.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derives the rate-limit key for a request.
///
/// With `trust_forwarded` set, the first entry of `X-Forwarded-For` wins when
/// present and non-empty. Only enable this behind a reverse proxy that
/// overwrites the header: otherwise any client can pick its own identity.
///
/// Falls back to the peer IP (port stripped), then to [`UNKNOWN_CLIENT`].
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_identity(&headers, None, true), "203.0.113.7");
/// ```
pub fn client_identity(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded: bool,
) -> String {
    if trust_forwarded
        && let Some(forwarded) = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
