//! Reporting over links, reconciled totals and sampled click logs.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::entities::{ClickDimension, ClickLog, ShortLink, ValueCount};
use crate::domain::repositories::{ClickLogRepository, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, keys};

/// Default and maximum number of recent sampled clicks returned per link.
pub const DEFAULT_RECENT: i64 = 10;
pub const MAX_RECENT: i64 = 100;

/// Links per analytics page.
pub const ANALYTICS_PAGE_SIZE: i64 = 10;
/// Entries in each grouped breakdown.
pub const TOP_VALUES: i64 = 5;
/// Reported for a link's top attributes when it has no sampled clicks.
pub const NO_DATA: &str = "N/A";

/// System-wide totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_links: i64,
    /// Sum of reconciled durable click totals.
    pub total_clicks: i64,
    /// Number of sampled click logs.
    pub sampled_clicks: i64,
    /// Entries waiting in the analytics queue, if the cache answered.
    pub queue_length: Option<u64>,
}

/// Statistics for one short link.
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub link: ShortLink,
    /// Exact counter from the cache; may be ahead of `link.clicks` until the next sync.
    pub realtime_clicks: Option<i64>,
    pub sampled_clicks: i64,
    pub recent: Vec<ClickLog>,
}

/// One row of the analytics link table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTrend {
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub top_country: String,
    pub top_device: String,
    pub top_browser: String,
}

/// Sampled-click breakdowns plus one page of links ranked by clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsReport {
    pub countries: Vec<ValueCount>,
    pub devices: Vec<ValueCount>,
    pub referrers: Vec<ValueCount>,
    pub links: Vec<LinkTrend>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Service for retrieving statistics.
pub struct StatsService {
    cache: Arc<dyn CacheService>,
    links: Arc<dyn LinkRepository>,
    click_logs: Arc<dyn ClickLogRepository>,
}

impl StatsService {
    /// Creates a new statistics service.
    pub fn new(
        cache: Arc<dyn CacheService>,
        links: Arc<dyn LinkRepository>,
        click_logs: Arc<dyn ClickLogRepository>,
    ) -> Self {
        Self {
            cache,
            links,
            click_logs,
        }
    }

    /// Retrieves system-wide totals.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors. Cache errors only blank
    /// out the queue length.
    pub async fn overview(&self) -> Result<Overview, AppError> {
        let total_links = self.links.count().await?;
        let total_clicks = self.links.total_clicks().await?;
        let sampled_clicks = self.click_logs.count(None).await?;

        let queue_length = match self.cache.llen(keys::ANALYTICS_QUEUE).await {
            Ok(len) => Some(len),
            Err(e) => {
                warn!(error = %e, "Failed to read analytics queue length");
                None
            }
        };

        Ok(Overview {
            total_links,
            total_clicks,
            sampled_clicks,
            queue_length,
        })
    }

    /// Retrieves statistics for a single short code.
    ///
    /// `recent` is clamped to `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn link_report(&self, code: &str, recent: i64) -> Result<LinkReport, AppError> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        let realtime_clicks = match self.cache.get(&keys::clicks(code)).await {
            Ok(value) => value.and_then(|v| v.parse().ok()),
            Err(e) => {
                warn!(short_code = %code, error = %e, "Failed to read click counter");
                None
            }
        };

        let sampled_clicks = self.click_logs.count(Some(link.id)).await?;
        let recent = self
            .click_logs
            .recent(link.id, recent.clamp(1, MAX_RECENT))
            .await?;

        Ok(LinkReport {
            link,
            realtime_clicks,
            sampled_clicks,
            recent,
        })
    }

    /// Builds the analytics dashboard for a 1-based `page` of links.
    ///
    /// Pages below 1 are treated as 1. Pages past the end yield an empty link table
    /// with the breakdowns still filled in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn analytics(&self, page: i64) -> Result<AnalyticsReport, AppError> {
        let current_page = page.max(1);

        let countries = self
            .click_logs
            .top_values(ClickDimension::Country, TOP_VALUES)
            .await?;
        let devices = self
            .click_logs
            .top_values(ClickDimension::Device, TOP_VALUES)
            .await?;
        let referrers = self
            .click_logs
            .top_values(ClickDimension::Referrer, TOP_VALUES)
            .await?;

        let total_count = self.links.count().await?;
        let offset = (current_page - 1).saturating_mul(ANALYTICS_PAGE_SIZE);
        let page_links = self
            .links
            .list_by_clicks(offset, ANALYTICS_PAGE_SIZE)
            .await?;

        let mut links = Vec::with_capacity(page_links.len());
        for link in page_links {
            links.push(LinkTrend {
                top_country: self.top_or_na(link.id, ClickDimension::Country).await?,
                top_device: self.top_or_na(link.id, ClickDimension::Device).await?,
                top_browser: self.top_or_na(link.id, ClickDimension::Browser).await?,
                short_code: link.short_code,
                original_url: link.original_url,
                clicks: link.clicks,
            });
        }

        Ok(AnalyticsReport {
            countries,
            devices,
            referrers,
            links,
            total_count,
            total_pages: (total_count + ANALYTICS_PAGE_SIZE - 1) / ANALYTICS_PAGE_SIZE,
            current_page,
        })
    }

    async fn top_or_na(&self, link_id: i64, dimension: ClickDimension) -> Result<String, AppError> {
        Ok(self
            .click_logs
            .top_value(link_id, dimension)
            .await?
            .unwrap_or_else(|| NO_DATA.to_string()))
    }
}
