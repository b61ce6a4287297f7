//! DTOs for statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use super::clicks::ClickInfo;
use crate::application::services::stats_service::{DEFAULT_RECENT, LinkReport, Overview};

/// System-wide totals.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub sampled_clicks: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_length: Option<u64>,
}

impl From<Overview> for OverviewResponse {
    fn from(o: Overview) -> Self {
        Self {
            total_links: o.total_links,
            total_clicks: o.total_clicks,
            sampled_clicks: o.sampled_clicks,
            queue_length: o.queue_length,
        }
    }
}

/// Query parameters for per-link statistics.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct LinkStatsQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub recent: Option<i64>,
}

impl LinkStatsQuery {
    pub fn recent(&self) -> i64 {
        self.recent.unwrap_or(DEFAULT_RECENT)
    }
}

/// Statistics for a single short link.
///
/// `clicks` is the reconciled durable total; `realtime_clicks` is the exact cache
/// counter and may be ahead until the next sync.
#[derive(Debug, Serialize)]
pub struct LinkStatsResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
    pub realtime_clicks: Option<i64>,
    pub sampled_clicks: i64,
    pub recent: Vec<ClickInfo>,
}

impl From<LinkReport> for LinkStatsResponse {
    fn from(r: LinkReport) -> Self {
        Self {
            short_code: r.link.short_code,
            original_url: r.link.original_url,
            created_at: r.link.created_at,
            clicks: r.link.clicks,
            realtime_clicks: r.realtime_clicks,
            sampled_clicks: r.sampled_clicks,
            recent: r.recent.into_iter().map(ClickInfo::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_defaults() {
        assert_eq!(LinkStatsQuery::default().recent(), DEFAULT_RECENT);
    }

    #[test]
    fn test_recent_parsed_from_string() {
        let q: LinkStatsQuery = serde_json::from_str(r#"{"recent":"25"}"#).unwrap();
        assert_eq!(q.recent(), 25);
        assert!(serde_json::from_str::<LinkStatsQuery>(r#"{"recent":"many"}"#).is_err());
    }
}
