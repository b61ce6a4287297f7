//! Per-IP request throttling for the API using a token bucket algorithm.
//!
//! This guards the API against bursts. The daily link creation quota is a separate
//! policy enforced by [`crate::application::services::RateLimiter`].

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

const PER_SECOND: u64 = 2;
const BURST_SIZE: u32 = 100;

/// Layer type produced for a given key extractor.
pub type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a rate limiter keyed by the socket peer address.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .layer(rate_limit::layer());
/// ```
pub fn layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor)
}

/// Creates a rate limiter that reads the client IP from `X-Forwarded-For`,
/// `X-Real-IP` and `Forwarded` before falling back to the peer address.
///
/// Only use behind a trusted reverse proxy; clients can forge these headers.
pub fn proxied_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor)
}

fn build<K: KeyExtractor>(key_extractor: K) -> RateLimitLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(PER_SECOND)
            .burst_size(BURST_SIZE)
            .finish()
            .expect("rate limit quota is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
