//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect, answered by the interceptor (public)
//! - `GET  /health`      - Health check: DB and cache (public)
//! - `/api/*`            - Shortening and admin API
//! - anything else       - JSON `404`
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging (outermost)
//! - **Short link interceptor** - Redirects cached codes before routing
//! - **Rate limiting** - Per-IP token bucket on `/api` (configurable for proxy deployments)
//!
//! Path normalization is applied by the server around the finished router.

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, short_link};
use crate::error::AppError;
use crate::state::AppState;
use axum::http::Uri;
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> Router {
    let api_router = if behind_proxy {
        api::routes::api_routes().layer(rate_limit::proxied_layer())
    } else {
        api::routes::api_routes().layer(rate_limit::layer())
    };

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            short_link::layer,
        ))
        .layer(trace_layer())
        .with_state(state)
}

/// One `INFO` span per request and one `INFO` event per response with status and
/// latency in milliseconds. Installed outermost so intercepted redirects are logged.
///
/// ```text
/// INFO request{method=GET uri=/aB3x_9 version=HTTP/1.1}: finished processing request latency=1 ms status=302
/// ```
fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found(
        "Not found",
        serde_json::json!({ "path": uri.path() }),
    )
}
