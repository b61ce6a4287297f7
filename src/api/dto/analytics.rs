//! DTOs for the analytics dashboard.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::stats_service::{AnalyticsReport, LinkTrend};
use crate::domain::entities::ValueCount;

/// Query parameters for the analytics dashboard.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,
}

impl AnalyticsQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

#[derive(Debug, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub count: i64,
}

impl From<ValueCount> for BreakdownEntry {
    fn from(v: ValueCount) -> Self {
        Self {
            name: v.value,
            count: v.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkTrendEntry {
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub top_country: String,
    pub top_device: String,
    pub top_browser: String,
}

impl From<LinkTrend> for LinkTrendEntry {
    fn from(t: LinkTrend) -> Self {
        Self {
            short_code: t.short_code,
            original_url: t.original_url,
            clicks: t.clicks,
            top_country: t.top_country,
            top_device: t.top_device,
            top_browser: t.top_browser,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Top countries, devices and referrers over sampled clicks, plus one page of
/// links ranked by reconciled click totals.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub countries: Vec<BreakdownEntry>,
    pub devices: Vec<BreakdownEntry>,
    pub referrers: Vec<BreakdownEntry>,
    pub links: Vec<LinkTrendEntry>,
    pub pagination: Pagination,
}

impl From<AnalyticsReport> for AnalyticsResponse {
    fn from(r: AnalyticsReport) -> Self {
        fn entries(values: Vec<ValueCount>) -> Vec<BreakdownEntry> {
            values.into_iter().map(BreakdownEntry::from).collect()
        }

        Self {
            countries: entries(r.countries),
            devices: entries(r.devices),
            referrers: entries(r.referrers),
            links: r.links.into_iter().map(LinkTrendEntry::from).collect(),
            pagination: Pagination {
                total_count: r.total_count,
                total_pages: r.total_pages,
                current_page: r.current_page,
            },
        }
    }
}
