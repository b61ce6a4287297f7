//! API route configuration.

use crate::api::handlers::{
    analytics_handler, get_ad_settings_handler, link_stats_handler, overview_handler, shorten_handler,
    sync_handler, update_ad_settings_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`              - Create a short link (daily quota per client)
/// - `POST /admin/sync`           - Drain a batch of sampled clicks into the store
/// - `GET  /admin/stats`          - System-wide totals
/// - `GET  /admin/stats/{code}`   - Statistics for one link
/// - `GET  /admin/analytics`      - Top countries, devices, referrers and a page of links
/// - `GET  /admin/ad-settings`    - Current ad redirect URL
/// - `PUT  /admin/ad-settings`    - Replace the ad redirect URL
///
/// Admin routes carry no authentication of their own; deploy them behind a
/// gateway that restricts access.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/admin/sync", post(sync_handler))
        .route("/admin/stats", get(overview_handler))
        .route("/admin/stats/{code}", get(link_stats_handler))
        .route("/admin/analytics", get(analytics_handler))
        .route(
            "/admin/ad-settings",
            get(get_ad_settings_handler).put(update_ad_settings_handler),
        )
}
