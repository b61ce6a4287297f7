//! In-memory implementation of every repository trait.
//!
//! Keeps all data in RAM with no persistence. Used by integration tests and local
//! development runs without PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::entities::{
    ClickDimension, ClickLog, NewClickLog, NewShortLink, ShortLink, ValueCount,
};
use crate::domain::repositories::{ClickLogRepository, LinkRepository, SettingsRepository};
use crate::error::AppError;

#[derive(Default)]
struct Tables {
    links: Vec<ShortLink>,
    click_logs: Vec<ClickLog>,
    ad_redirect_url: Option<String>,
}

/// A shared in-memory store for links, click logs and settings.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing_click_inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` click log inserts fail with an internal error.
    pub fn fail_next_click_inserts(&self, n: usize) {
        self.failing_click_inserts.store(n, Ordering::SeqCst);
    }

    /// Snapshot of a link by code.
    pub fn link(&self, code: &str) -> Option<ShortLink> {
        self.tables
            .read()
            .links
            .iter()
            .find(|l| l.short_code == code)
            .cloned()
    }

    /// Snapshot of every stored click log.
    pub fn click_logs(&self) -> Vec<ClickLog> {
        self.tables.read().click_logs.clone()
    }

    fn grouped<'a>(
        logs: impl Iterator<Item = &'a ClickLog>,
        dimension: ClickDimension,
    ) -> Vec<ValueCount> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for log in logs {
            *counts.entry(dimension.value_of(log)).or_default() += 1;
        }

        let mut grouped: Vec<ValueCount> = counts
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect();
        grouped.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        grouped
    }

    fn take_failure(&self) -> bool {
        self.failing_click_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut tables = self.tables.write();

        if tables
            .links
            .iter()
            .any(|l| l.short_code == new_link.short_code)
        {
            return Err(AppError::conflict(
                "Resource already exists",
                serde_json::json!({ "short_code": new_link.short_code }),
            ));
        }

        let link = ShortLink::new(
            tables.links.len() as i64 + 1,
            new_link.original_url,
            new_link.short_code,
            new_link.creator_ip,
            0,
            Utc::now(),
        );
        tables.links.push(link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.link(code))
    }

    async fn set_clicks(&self, id: i64, clicks: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write();
        match tables.links.iter_mut().find(|l| l.id == id) {
            Some(link) => {
                link.clicks = clicks;
                Ok(())
            }
            None => Err(AppError::not_found(
                "Short link not found",
                serde_json::json!({ "id": id }),
            )),
        }
    }

    async fn list_by_clicks(&self, offset: i64, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let mut links = self.tables.read().links.clone();
        links.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(a.id.cmp(&b.id)));

        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().links.len() as i64)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().links.iter().map(|l| l.clicks).sum())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ClickLogRepository for MemoryStore {
    async fn create(&self, new_log: NewClickLog) -> Result<ClickLog, AppError> {
        if self.take_failure() {
            return Err(AppError::internal(
                "Database error",
                serde_json::json!({ "reason": "injected failure" }),
            ));
        }

        let mut tables = self.tables.write();
        if !tables.links.iter().any(|l| l.id == new_log.short_link_id) {
            return Err(AppError::not_found(
                "Short link not found",
                serde_json::json!({ "id": new_log.short_link_id }),
            ));
        }

        let log = ClickLog {
            id: tables.click_logs.len() as i64 + 1,
            short_link_id: new_log.short_link_id,
            ip_address: new_log.ip_address,
            user_agent: new_log.user_agent,
            referrer: new_log.referrer,
            country: new_log.country,
            city: new_log.city,
            device: new_log.device,
            os: new_log.os,
            browser: new_log.browser,
            clicked_at: new_log.clicked_at,
            created_at: Utc::now(),
        };
        tables.click_logs.push(log.clone());

        Ok(log)
    }

    async fn count(&self, short_link_id: Option<i64>) -> Result<i64, AppError> {
        let tables = self.tables.read();
        Ok(tables
            .click_logs
            .iter()
            .filter(|c| short_link_id.is_none_or(|id| c.short_link_id == id))
            .count() as i64)
    }

    async fn recent(&self, short_link_id: i64, limit: i64) -> Result<Vec<ClickLog>, AppError> {
        let tables = self.tables.read();
        let mut logs: Vec<ClickLog> = tables
            .click_logs
            .iter()
            .filter(|c| c.short_link_id == short_link_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn top_values(
        &self,
        dimension: ClickDimension,
        limit: i64,
    ) -> Result<Vec<ValueCount>, AppError> {
        let tables = self.tables.read();
        let mut grouped = Self::grouped(tables.click_logs.iter(), dimension);
        grouped.truncate(limit.max(0) as usize);
        Ok(grouped)
    }

    async fn top_value(
        &self,
        short_link_id: i64,
        dimension: ClickDimension,
    ) -> Result<Option<String>, AppError> {
        let tables = self.tables.read();
        let logs = tables
            .click_logs
            .iter()
            .filter(|c| c.short_link_id == short_link_id);

        Ok(Self::grouped(logs, dimension)
            .into_iter()
            .next()
            .map(|top| top.value))
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn ad_redirect_url(&self) -> Result<Option<String>, AppError> {
        Ok(self.tables.read().ad_redirect_url.clone())
    }

    async fn set_ad_redirect_url(&self, url: &str) -> Result<(), AppError> {
        self.tables.write().ad_redirect_url = Some(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DeviceClass;

    fn new_link(code: &str) -> NewShortLink {
        NewShortLink {
            original_url: "https://example.com".to_string(),
            short_code: code.to_string(),
            creator_ip: "127.0.0.1".to_string(),
        }
    }

    fn new_log(link_id: i64) -> NewClickLog {
        NewClickLog {
            short_link_id: link_id,
            ip_address: "127.0.0.1".to_string(),
            user_agent: None,
            referrer: "Direct".to_string(),
            country: "Unknown".to_string(),
            city: "Unknown".to_string(),
            device: DeviceClass::Desktop,
            os: None,
            browser: None,
            clicked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let store = MemoryStore::new();
        LinkRepository::create(&store, new_link("abc123")).await.unwrap();

        let err = LinkRepository::create(&store, new_link("abc123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_set_clicks_and_totals() {
        let store = MemoryStore::new();
        let a = LinkRepository::create(&store, new_link("aaaaaa")).await.unwrap();
        let b = LinkRepository::create(&store, new_link("bbbbbb")).await.unwrap();

        store.set_clicks(a.id, 57).await.unwrap();
        store.set_clicks(b.id, 3).await.unwrap();

        assert_eq!(store.total_clicks().await.unwrap(), 60);
        assert_eq!(LinkRepository::count(&store).await.unwrap(), 2);
        assert!(store.set_clicks(99, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_injected_click_insert_failures() {
        let store = MemoryStore::new();
        let link = LinkRepository::create(&store, new_link("abc123")).await.unwrap();
        store.fail_next_click_inserts(1);

        assert!(ClickLogRepository::create(&store, new_log(link.id)).await.is_err());
        assert!(ClickLogRepository::create(&store, new_log(link.id)).await.is_ok());
        assert_eq!(ClickLogRepository::count(&store, Some(link.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_is_limited() {
        let store = MemoryStore::new();
        let link = LinkRepository::create(&store, new_link("abc123")).await.unwrap();
        for _ in 0..5 {
            ClickLogRepository::create(&store, new_log(link.id)).await.unwrap();
        }

        let recent = store.recent(link.id, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent[0].id > recent[2].id);
    }

    #[tokio::test]
    async fn test_top_values_rank_by_count_then_value() {
        let store = MemoryStore::new();
        let a = LinkRepository::create(&store, new_link("aaaaaa")).await.unwrap();
        let b = LinkRepository::create(&store, new_link("bbbbbb")).await.unwrap();
        for (link, country) in [(a.id, "KR"), (a.id, "KR"), (b.id, "US"), (b.id, "DE")] {
            let mut log = new_log(link);
            log.country = country.to_string();
            ClickLogRepository::create(&store, log).await.unwrap();
        }

        let top = store.top_values(ClickDimension::Country, 2).await.unwrap();
        assert_eq!(
            top,
            vec![
                ValueCount { value: "KR".into(), count: 2 },
                ValueCount { value: "DE".into(), count: 1 },
            ]
        );

        let browsers = store.top_values(ClickDimension::Browser, 5).await.unwrap();
        assert_eq!(browsers, vec![ValueCount { value: "Unknown".into(), count: 4 }]);

        assert_eq!(
            store.top_value(a.id, ClickDimension::Country).await.unwrap(),
            Some("KR".to_string())
        );
        let c = LinkRepository::create(&store, new_link("cccccc")).await.unwrap();
        assert_eq!(store.top_value(c.id, ClickDimension::Country).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_by_clicks_pages_highest_first() {
        let store = MemoryStore::new();
        for (code, clicks) in [("aaaaaa", 1), ("bbbbbb", 9), ("cccccc", 5)] {
            let link = LinkRepository::create(&store, new_link(code)).await.unwrap();
            store.set_clicks(link.id, clicks).await.unwrap();
        }

        let first: Vec<String> = store
            .list_by_clicks(0, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.short_code)
            .collect();
        assert_eq!(first, ["bbbbbb", "cccccc"]);

        let second = store.list_by_clicks(2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].short_code, "aaaaaa");
    }
}
