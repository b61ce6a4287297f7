//! Redirect interceptor for short link paths.
//!
//! Runs in front of every route. A `GET`/`HEAD` request whose first path segment
//! looks like a short code is answered from the cache with a `302 Found`; anything
//! else, including misses and cache failures, continues to normal routing.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::domain::click_event::ClickContext;
use crate::state::AppState;
use crate::utils::client_info;

/// Shared caches keep redirects for a day and may serve a stale copy while revalidating.
pub const REDIRECT_CACHE_CONTROL: &str =
    "public, max-age=86400, s-maxage=86400, stale-while-revalidate=59";

/// Intercepts short link requests.
///
/// # Flow
///
/// 1. Skip non-`GET`/`HEAD` requests and paths that cannot be a short code
/// 2. Resolve `short:<code>` from the cache, bounded by the lookup timeout
/// 3. On a hit, hand the click off to background telemetry and answer `302`
/// 4. Otherwise pass the request to the next service
///
/// The response never waits on telemetry.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/health", get(health_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), short_link::layer));
/// ```
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return next.run(req).await;
    }

    let Some(code) = state
        .redirect_service
        .candidate_code(req.uri().path())
        .map(str::to_string)
    else {
        return next.run(req).await;
    };

    let Some(destination) = state.redirect_service.resolve(&code).await else {
        metrics::counter!("redirect_fallthrough_total").increment(1);
        return next.run(req).await;
    };

    let location = match HeaderValue::from_str(&destination) {
        Ok(value) => value,
        Err(e) => {
            debug!(short_code = %code, error = %e, "Cached destination is not a valid header");
            return next.run(req).await;
        }
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let context = click_context(req.headers(), peer, state.behind_proxy);

    state.redirect_service.record_hit(&code, context);
    metrics::counter!("redirects_total").increment(1);

    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(REDIRECT_CACHE_CONTROL),
            ),
        ],
    )
        .into_response()
}

fn click_context(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> ClickContext {
    ClickContext {
        ip: client_info::client_ip(headers, peer, behind_proxy),
        user_agent: client_info::user_agent(headers),
        referrer: client_info::referrer(headers),
        country: client_info::geo_country(headers),
        city: client_info::geo_city(headers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "curl/8.0".parse().unwrap());
        headers.insert(header::REFERER, "https://news.example".parse().unwrap());
        headers.insert("x-forwarded-for", "203.0.113.7".parse().unwrap());

        let peer: SocketAddr = "10.0.0.1:4000".parse().unwrap();

        let direct = click_context(&headers, Some(peer), false);
        assert_eq!(direct.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(direct.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(direct.referrer.as_deref(), Some("https://news.example"));

        let proxied = click_context(&headers, Some(peer), true);
        assert_eq!(proxied.ip.as_deref(), Some("203.0.113.7"));
    }
}
