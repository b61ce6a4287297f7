//! Click telemetry captured on the redirect path.
//!
//! A [`ClickContext`] is built from request headers for every resolved redirect. When
//! the sampler selects the hit, it is turned into a [`ClickPayload`], serialized to
//! JSON and appended to the analytics queue. The sync worker parses it back with
//! [`ClickPayload::parse`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::{DeviceClass, NewClickLog};
use crate::utils::user_agent;

pub const UNKNOWN: &str = "Unknown";
pub const DIRECT: &str = "Direct";

/// Raw request details available to the redirect middleware.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Serialized form of a sampled click on the analytics queue.
///
/// Field names are camelCase on the wire. Only `shortCode` is mandatory when parsing;
/// absent descriptive fields fall back to `Unknown`/`Direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPayload {
    pub short_code: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "unknown")]
    pub ip: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "direct")]
    pub referrer: String,
    #[serde(default = "unknown")]
    pub country: String,
    #[serde(default = "unknown")]
    pub city: String,
    #[serde(default = "desktop")]
    pub device: DeviceClass,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn direct() -> String {
    DIRECT.to_string()
}

fn desktop() -> DeviceClass {
    DeviceClass::Desktop
}

/// Reasons a queued entry cannot be processed.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has an empty shortCode")]
    MissingShortCode,
}

impl ClickPayload {
    /// Builds the payload for a sampled hit, parsing the user agent.
    pub fn assemble(short_code: &str, context: ClickContext, timestamp: DateTime<Utc>) -> Self {
        let agent = user_agent::classify(context.user_agent.as_deref());

        Self {
            short_code: short_code.to_string(),
            timestamp,
            ip: context.ip.unwrap_or_else(unknown),
            user_agent: context.user_agent,
            referrer: context.referrer.unwrap_or_else(direct),
            country: context.country.unwrap_or_else(unknown),
            city: context.city.unwrap_or_else(unknown),
            device: agent.device,
            browser: agent.browser,
            os: agent.os,
        }
    }

    /// Parses a queued entry.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the entry is not a JSON object with a non-empty
    /// `shortCode`.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let payload: Self = serde_json::from_str(raw)?;
        if payload.short_code.trim().is_empty() {
            return Err(PayloadError::MissingShortCode);
        }
        Ok(payload)
    }

    /// Serializes the payload for the queue.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Detail record for the link this payload resolved to.
    pub fn into_click_log(self, short_link_id: i64) -> NewClickLog {
        NewClickLog {
            short_link_id,
            ip_address: self.ip,
            user_agent: self.user_agent,
            referrer: self.referrer,
            country: self.country,
            city: self.city,
            device: self.device,
            os: self.os,
            browser: self.browser,
            clicked_at: self.timestamp,
        }
    }
}
