#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use snaplink::infrastructure::cache::MemoryCache;
use snaplink::infrastructure::persistence::MemoryStore;
use snaplink::infrastructure::tasks::DeferredSpawner;
use snaplink::routes::app_router;
use snaplink::state::{AppState, Backends, RuntimeOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

pub const BASE_URL: &str = "https://sho.rt";

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
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
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// The full router over in-memory backends, with telemetry held until
/// [`DeferredSpawner::run_pending`] is awaited.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub cache: Arc<MemoryCache>,
    pub store: Arc<MemoryStore>,
    pub spawner: Arc<DeferredSpawner>,
}

pub fn options() -> RuntimeOptions {
    RuntimeOptions {
        sample_seed: Some(7),
        base_url: BASE_URL.to_string(),
        ..RuntimeOptions::default()
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(options())
}

pub fn spawn_app_with(options: RuntimeOptions) -> TestApp {
    let cache = Arc::new(MemoryCache::new());
    let store = Arc::new(MemoryStore::new());
    let spawner = Arc::new(DeferredSpawner::new());

    let behind_proxy = options.behind_proxy;
    let state = AppState::new(
        Backends::in_memory(cache.clone(), store.clone(), spawner.clone()),
        options,
    );

    let app: Router = app_router(state.clone(), behind_proxy).layer(MockConnectInfoLayer);
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        state,
        cache,
        store,
        spawner,
    }
}

impl TestApp {
    /// Shortens `url` through the API and returns the new code.
    pub async fn shorten(&self, url: &str) -> String {
        let response = self
            .server
            .post("/api/shorten")
            .json(&serde_json::json!({ "url": url }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let json = response.json::<serde_json::Value>();
        json["short_code"].as_str().unwrap().to_string()
    }
}
