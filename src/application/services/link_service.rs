//! Link creation service.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use crate::application::services::RateLimiter;
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::domain::reserved_paths::ReservedPaths;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, keys};
use crate::utils::code_generator::generate_code;
use crate::utils::url_normalizer::normalize_url;

/// Attempts at finding a free code before giving up.
const MAX_ATTEMPTS: usize = 10;

/// Service for creating shortened links.
///
/// Validates the destination, applies the daily rate limit, picks a free code,
/// persists the link and seeds the redirect cache.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    rate_limiter: RateLimiter,
    enforce_rate_limit: bool,
    reserved: Arc<ReservedPaths>,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        rate_limiter: RateLimiter,
        enforce_rate_limit: bool,
        reserved: Arc<ReservedPaths>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            links,
            cache,
            rate_limiter,
            enforce_rate_limit,
            reserved,
            base_url: base_url.into(),
        }
    }

    /// Creates a short link for `url` on behalf of `client_ip`.
    ///
    /// # Order of checks
    ///
    /// 1. URL validation, before any cache or store work
    /// 2. Daily rate limit, when enforced
    /// 3. Code generation, skipping reserved segments and existing codes
    /// 4. Durable insert, then `short:<code>` is written to the cache
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an absolute HTTP(S) URL.
    /// Returns [`AppError::RateLimited`] once the client exceeded its daily limit.
    /// Returns [`AppError::Unavailable`] if the cache cannot be reached.
    /// Returns [`AppError::Internal`] on database errors or repeated code collisions.
    pub async fn shorten(&self, url: &str, client_ip: &str) -> Result<ShortLink, AppError> {
        let original_url = normalize_url(url).map_err(|e| {
            AppError::bad_request("Invalid URL provided", json!({ "reason": e.to_string() }))
        })?;

        if self.enforce_rate_limit {
            self.rate_limiter.enforce(client_ip).await?;
        }

        let short_code = self.generate_unique_code().await?;

        let link = self
            .links
            .create(NewShortLink {
                original_url,
                short_code,
                creator_ip: client_ip.to_string(),
            })
            .await?;

        if let Err(e) = self
            .cache
            .set(&keys::short_url(&link.short_code), &link.original_url)
            .await
        {
            error!(short_code = %link.short_code, error = %e, "Failed to seed redirect cache");
            return Err(e.into());
        }

        info!(short_code = %link.short_code, "Short link created");
        Ok(link)
    }

    /// Full public URL for a short code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_ATTEMPTS {
            let code = generate_code()?;

            if self.reserved.contains(&code) {
                continue;
            }

            if self.links.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::MemoryCache;
    use chrono::Utc;

    fn created(new_link: NewShortLink) -> ShortLink {
        ShortLink::new(
            1,
            new_link.original_url,
            new_link.short_code,
            new_link.creator_ip,
            0,
            Utc::now(),
        )
    }

    fn service(links: MockLinkRepository, cache: Arc<MemoryCache>, enforce: bool) -> LinkService {
        LinkService::new(
            Arc::new(links),
            cache.clone(),
            RateLimiter::new(cache, 5),
            enforce,
            Arc::new(ReservedPaths::default()),
            "https://sho.rt/",
        )
    }

    #[tokio::test]
    async fn test_shorten_persists_and_seeds_cache() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|_| Ok(None));
        links
            .expect_create()
            .withf(|l| l.original_url == "https://example.com/page" && l.creator_ip == "10.0.0.1")
            .times(1)
            .returning(|l| Ok(created(l)));

        let cache = Arc::new(MemoryCache::new());
        let service = service(links, cache.clone(), true);

        let link = service
            .shorten("https://EXAMPLE.com/page", "10.0.0.1")
            .await
            .unwrap();

        assert_eq!(link.short_code.len(), 6);
        assert_eq!(
            cache.get(&keys::short_url(&link.short_code)).await.unwrap(),
            Some("https://example.com/page".to_string())
        );
        assert_eq!(cache.get("rate:10.0.0.1").await.unwrap(), Some("1".into()));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_rate_limit() {
        let links = MockLinkRepository::new();
        let cache = Arc::new(MemoryCache::new());
        let service = service(links, cache.clone(), true);

        let err = service.shorten("not-a-url", "10.0.0.1").await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(cache.get("rate:10.0.0.1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rate_limited_before_persistence() {
        let mut links = MockLinkRepository::new();
        links.expect_create().times(0);

        let cache = Arc::new(MemoryCache::new());
        for _ in 0..5 {
            cache.incr("rate:10.0.0.1").await.unwrap();
        }
        let service = service(links, cache, true);

        let err = service
            .shorten("https://example.com", "10.0.0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_bypassed_when_not_enforced() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(None));
        links.expect_create().returning(|l| Ok(created(l)));

        let cache = Arc::new(MemoryCache::new());
        let service = service(links, cache.clone(), false);

        for _ in 0..7 {
            service
                .shorten("https://example.com", "10.0.0.1")
                .await
                .unwrap();
        }
        assert_eq!(cache.get("rate:10.0.0.1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_collision_regenerates_code() {
        let mut links = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        links
            .expect_find_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|code| {
                Ok(Some(ShortLink::new(
                    9,
                    "https://taken.example".into(),
                    code.to_string(),
                    "10.0.0.9".into(),
                    0,
                    Utc::now(),
                )))
            });
        links
            .expect_find_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        links.expect_create().times(1).returning(|l| Ok(created(l)));

        let service = service(links, Arc::new(MemoryCache::new()), false);
        assert!(service.shorten("https://example.com", "10.0.0.1").await.is_ok());
    }

    #[tokio::test]
    async fn test_cache_seed_failure_is_reported() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(None));
        links.expect_create().returning(|l| Ok(created(l)));

        let cache = Arc::new(MemoryCache::new());
        cache.set_available(false);
        let service = service(links, cache, false);

        let err = service
            .shorten("https://example.com", "10.0.0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable { .. }));
    }

    #[test]
    fn test_short_url() {
        let service = service(MockLinkRepository::new(), Arc::new(MemoryCache::new()), false);
        assert_eq!(service.short_url("abc123"), "https://sho.rt/abc123");
    }
}
