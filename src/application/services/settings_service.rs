//! Ad redirect setting with cache-first reads.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, keys};
use crate::utils::url_normalizer::normalize_url;

/// Served when neither the cache nor the store has a value, or both fail.
pub const DEFAULT_AD_REDIRECT_URL: &str = "https://google.com";

pub struct SettingsService {
    cache: Arc<dyn CacheService>,
    settings: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(cache: Arc<dyn CacheService>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self { cache, settings }
    }

    /// Reads the ad redirect URL.
    ///
    /// Tries the cache first, then the durable store, then the default. Whatever the
    /// store path resolves to is written back to the cache. Never fails.
    pub async fn ad_redirect_url(&self) -> String {
        match self.cache.get(keys::AD_REDIRECT_URL).await {
            Ok(Some(url)) => return url,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ad URL cache read failed"),
        }

        let url = match self.settings.ad_redirect_url().await {
            Ok(Some(url)) => url,
            Ok(None) => DEFAULT_AD_REDIRECT_URL.to_string(),
            Err(e) => {
                warn!(error = %e, "Ad URL store read failed, serving default");
                return DEFAULT_AD_REDIRECT_URL.to_string();
            }
        };

        if let Err(e) = self.cache.set(keys::AD_REDIRECT_URL, &url).await {
            warn!(error = %e, "Failed to backfill ad URL cache");
        }

        url
    }

    /// Validates and stores a new ad redirect URL, durable store first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a non-HTTP(S) URL.
    /// Returns [`AppError::Internal`] if the store write fails.
    /// Returns [`AppError::Unavailable`] if the store was updated but the cache was not.
    pub async fn set_ad_redirect_url(&self, url: &str) -> Result<String, AppError> {
        let url = normalize_url(url).map_err(|e| {
            AppError::bad_request("Invalid URL provided", json!({ "reason": e.to_string() }))
        })?;

        self.settings.set_ad_redirect_url(&url).await?;
        self.cache.set(keys::AD_REDIRECT_URL, &url).await?;

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockSettingsRepository;
    use crate::infrastructure::cache::MemoryCache;

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let cache = Arc::new(MemoryCache::new());
        cache.set(keys::AD_REDIRECT_URL, "https://ads.example").await.unwrap();

        let mut settings = MockSettingsRepository::new();
        settings.expect_ad_redirect_url().times(0);

        let service = SettingsService::new(cache, Arc::new(settings));
        assert_eq!(service.ad_redirect_url().await, "https://ads.example");
    }

    #[tokio::test]
    async fn test_store_fallback_backfills_cache() {
        let cache = Arc::new(MemoryCache::new());
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_ad_redirect_url()
            .times(1)
            .returning(|| Ok(Some("https://stored.example".into())));

        let service = SettingsService::new(cache.clone(), Arc::new(settings));

        assert_eq!(service.ad_redirect_url().await, "https://stored.example");
        assert_eq!(
            cache.get(keys::AD_REDIRECT_URL).await.unwrap().as_deref(),
            Some("https://stored.example")
        );
    }

    #[tokio::test]
    async fn test_failures_serve_default() {
        let cache = Arc::new(MemoryCache::new());
        cache.set_available(false);
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_ad_redirect_url()
            .returning(|| Err(AppError::internal("Database error", json!({}))));

        let service = SettingsService::new(cache, Arc::new(settings));
        assert_eq!(service.ad_redirect_url().await, DEFAULT_AD_REDIRECT_URL);
    }

    #[tokio::test]
    async fn test_set_rejects_invalid_url() {
        let mut settings = MockSettingsRepository::new();
        settings.expect_set_ad_redirect_url().times(0);

        let service = SettingsService::new(Arc::new(MemoryCache::new()), Arc::new(settings));
        let err = service.set_ad_redirect_url("javascript:alert(1)").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_set_writes_store_then_cache() {
        let cache = Arc::new(MemoryCache::new());
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_set_ad_redirect_url()
            .withf(|url| url == "https://new.example/")
            .times(1)
            .returning(|_| Ok(()));

        let service = SettingsService::new(cache.clone(), Arc::new(settings));
        let stored = service.set_ad_redirect_url("https://NEW.example").await.unwrap();

        assert_eq!(stored, "https://new.example/");
        assert_eq!(
            cache.get(keys::AD_REDIRECT_URL).await.unwrap(),
            Some(stored)
        );
    }
}
