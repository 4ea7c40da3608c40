#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use url_minifier::application::services::{AllocatorSettings, UrlService};
use url_minifier::domain::rate_limiter::RateLimiter;
use url_minifier::infrastructure::persistence::InMemoryUrlRepository;
use url_minifier::routes::app_router;
use url_minifier::state::AppState;

pub const BASE_URL: &str = "http://sho.rt/";

/// Inserts a fixed `ConnectInfo` the way `into_make_service_with_connect_info` does.
#[derive(Clone)]
pub struct MockConnectInfoLayer {
    addr: SocketAddr,
}

impl MockConnectInfoLayer {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.parse().unwrap(),
        }
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.addr,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}

pub fn create_test_state(limiter: RateLimiter, behind_proxy: bool) -> (AppState, Arc<InMemoryUrlRepository>) {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let service = Arc::new(UrlService::new(repo.clone(), AllocatorSettings::default()));

    let state = AppState::new(service, Arc::new(limiter), BASE_URL, behind_proxy);

    (state, repo)
}

/// Limiter generous enough that handler tests never hit it.
pub fn relaxed_limiter() -> RateLimiter {
    RateLimiter::new(10_000, Duration::from_secs(60))
}

/// Full application router as served in production, seen from `peer`.
pub fn create_test_server_from(state: AppState, peer: &str) -> TestServer {
    let app = Router::new()
        .fallback_service(app_router(state))
        .layer(MockConnectInfoLayer::new(peer));

    TestServer::new(app).unwrap()
}

pub fn create_test_server(state: AppState) -> TestServer {
    create_test_server_from(state, "127.0.0.1:12345")
}

/// Returns the code part of a short URL produced with [`BASE_URL`].
pub fn code_of(short_url: &str) -> String {
    short_url
        .strip_prefix(BASE_URL)
        .expect("short_url should start with BASE_URL")
        .to_string()
}
