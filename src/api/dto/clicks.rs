//! DTOs for sampled click records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::ClickLog;

/// One sampled click.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub clicked_at: DateTime<Utc>,
    pub ip: String,
    pub referrer: String,
    pub country: String,
    pub city: String,
    pub device: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl From<ClickLog> for ClickInfo {
    fn from(log: ClickLog) -> Self {
        Self {
            clicked_at: log.clicked_at,
            ip: log.ip_address,
            referrer: log.referrer,
            country: log.country,
            city: log.city,
            device: log.device.to_string(),
            browser: log.browser,
            os: log.os,
            user_agent: log.user_agent,
        }
    }
}
