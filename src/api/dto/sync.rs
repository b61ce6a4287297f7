//! DTOs for the analytics sync trigger.

use serde::Serialize;

use crate::application::services::SyncReport;

/// Result of one sync pass.
///
/// Serialized without a tag: either `{ "synced": n, ... }` or
/// `{ "message": "Nothing to sync" }`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SyncResponse {
    Synced {
        synced: usize,
        read: usize,
        skipped: usize,
        failed: usize,
    },
    Empty {
        message: &'static str,
    },
}

impl SyncResponse {
    pub fn empty() -> Self {
        SyncResponse::Empty {
            message: "Nothing to sync",
        }
    }
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        SyncResponse::Synced {
            synced: report.processed,
            read: report.read,
            skipped: report.skipped,
            failed: report.failed,
        }
    }
}
