//! Handler for link shortening endpoint.

use axum::{
    Extension, Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::domain::click_event::UNKNOWN;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::client_ip;

/// Creates a short link for one URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "aB3x_9",
///   "short_url": "https://sho.rt/aB3x_9",
///   "original_url": "https://example.com/some/long/path"
/// }
/// ```
///
/// # Errors
///
/// - **400** if the body is not JSON, or the URL is missing or not an absolute HTTP(S) URL
/// - **429** once the client created its daily allowance of links
/// - **503** if the cache backing the rate limiter is unreachable
pub async fn shorten_handler(
    State(state): State<AppState>,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid URL provided",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let peer = connect_info.map(|Extension(ConnectInfo(addr))| addr);
    let ip = client_ip(&headers, peer, state.behind_proxy).unwrap_or_else(|| UNKNOWN.to_string());

    let link = state.link_service.shorten(&payload.url, &ip).await?;
    let short_url = state.link_service.short_url(&link.short_code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::new(link, short_url)),
    ))
}
