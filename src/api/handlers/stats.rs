//! Handlers for statistics endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::analytics::{AnalyticsQuery, AnalyticsResponse};
use crate::api::dto::stats::{LinkStatsQuery, LinkStatsResponse, OverviewResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns system-wide totals.
///
/// # Endpoint
///
/// `GET /api/admin/stats`
///
/// # Response
///
/// ```json
/// {
///   "total_links": 120,
///   "total_clicks": 5400,
///   "sampled_clicks": 531,
///   "queue_length": 12
/// }
/// ```
pub async fn overview_handler(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, AppError> {
    let overview = state.stats_service.overview().await?;
    Ok(Json(overview.into()))
}

/// Returns statistics for a single short link.
///
/// # Endpoint
///
/// `GET /api/admin/stats/{code}?recent=10`
///
/// `recent` bounds the number of sampled clicks returned (1 to 100).
///
/// # Errors
///
/// Returns 404 if the code does not exist.
pub async fn link_stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<LinkStatsQuery>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    let report = state
        .stats_service
        .link_report(&code, query.recent())
        .await?;
    Ok(Json(report.into()))
}

/// Returns the analytics dashboard.
///
/// # Endpoint
///
/// `GET /api/admin/analytics?page=1`
///
/// Breakdowns cover the five most frequent countries, devices and referrers among
/// sampled clicks. Links are listed ten per page, highest click total first.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let report = state.stats_service.analytics(query.page()).await?;
    Ok(Json(report.into()))
}
