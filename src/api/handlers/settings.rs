//! Handlers for the ad redirect setting.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use crate::api::dto::settings::{AdSettingsRequest, AdSettingsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/admin/ad-settings`
///
/// Always answers; falls back to the built-in default when nothing is configured.
pub async fn get_ad_settings_handler(State(state): State<AppState>) -> Json<AdSettingsResponse> {
    Json(AdSettingsResponse {
        url: state.settings_service.ad_redirect_url().await,
    })
}

/// `PUT /api/admin/ad-settings`
///
/// Persists the new URL, then refreshes the cached copy.
pub async fn update_ad_settings_handler(
    State(state): State<AppState>,
    payload: Result<Json<AdSettingsRequest>, JsonRejection>,
) -> Result<Json<AdSettingsResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let url = state
        .settings_service
        .set_ad_redirect_url(&payload.url)
        .await?;

    Ok(Json(AdSettingsResponse { url }))
}
