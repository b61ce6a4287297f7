//! Handler for the analytics sync trigger.

use axum::{Json, extract::State};
use serde_json::json;

use crate::api::dto::sync::SyncResponse;
use crate::application::services::SyncOutcome;
use crate::error::AppError;
use crate::infrastructure::cache::keys;
use crate::state::AppState;

/// Runs one analytics sync pass.
///
/// # Endpoint
///
/// `POST /api/admin/sync`
///
/// # Response
///
/// ```json
/// { "synced": 42, "read": 43, "skipped": 1, "failed": 0 }
/// ```
///
/// or `{ "message": "Nothing to sync" }` when the queue is empty.
///
/// # Errors
///
/// - **409** if another pass holds the sync lock
/// - **503** if the queue cannot be read or trimmed
pub async fn sync_handler(State(state): State<AppState>) -> Result<Json<SyncResponse>, AppError> {
    match state.analytics_sync.sync().await? {
        SyncOutcome::Empty => Ok(Json(SyncResponse::empty())),
        SyncOutcome::Synced(report) => Ok(Json(report.into())),
        SyncOutcome::AlreadyRunning => Err(AppError::conflict(
            "Analytics sync already running",
            json!({ "lock": keys::SYNC_LOCK }),
        )),
    }
}
