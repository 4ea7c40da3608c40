use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::application::services::UrlService;
use crate::domain::rate_limiter::RateLimiter;

/// Shared state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Prefix for returned short URLs, always ending in `/`.
    pub base_url: String,
    /// Trust `X-Forwarded-For` for client identity.
    pub behind_proxy: bool,
    /// Renders `GET /metrics`. `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        rate_limiter: Arc<RateLimiter>,
        base_url: impl Into<String>,
        behind_proxy: bool,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            url_service,
            rate_limiter,
            base_url,
            behind_proxy,
            metrics: None,
        }
    }

    /// Exposes the given recorder's output on `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}{}", self.base_url, code)
    }
}
