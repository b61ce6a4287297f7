//! Daily per-client ceiling on link creation.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, CacheService, keys};

/// Length of the rate-limit window.
pub const WINDOW_SECONDS: u64 = 86_400;

/// Default number of links a client may create per window.
pub const DEFAULT_DAILY_LIMIT: i64 = 5;

/// Counts shorten attempts per client in the cache.
///
/// The counter is incremented atomically and given its expiry only when the
/// increment created it, so no read-before-write is needed. A concurrent increment
/// racing the expiry call at worst stretches a window slightly past one day.
pub struct RateLimiter {
    cache: Arc<dyn CacheService>,
    daily_limit: i64,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheService>, daily_limit: i64) -> Self {
        Self { cache, daily_limit }
    }

    pub fn daily_limit(&self) -> i64 {
        self.daily_limit
    }

    /// Increments the counter for `client_key` and returns the post-increment count.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`crate::infrastructure::cache::CacheError`] when the
    /// cache cannot be reached.
    pub async fn check(&self, client_key: &str) -> CacheResult<i64> {
        let key = keys::rate(client_key);
        let count = self.cache.incr(&key).await?;

        if count == 1
            && let Err(e) = self.cache.expire(&key, WINDOW_SECONDS).await
        {
            // Without an expiry the counter would never reset.
            if let Err(del_err) = self.cache.del(&key).await {
                warn!(key = %key, error = %del_err, "Failed to drop rate counter without expiry");
            }
            return Err(e);
        }

        Ok(count)
    }

    /// Admits or rejects one creation attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateLimited`] once the count exceeds the daily limit.
    /// Returns [`AppError::Unavailable`] when the cache is down; creation fails
    /// closed while the limit is enforced.
    pub async fn enforce(&self, client_key: &str) -> Result<i64, AppError> {
        let count = self.check(client_key).await.map_err(|e| {
            warn!(client = %client_key, error = %e, "Rate limiter unavailable, rejecting");
            AppError::unavailable(
                "Rate limiter unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;

        if count > self.daily_limit {
            metrics::counter!("shorten_rate_limited_total").increment(1);
            return Err(AppError::rate_limited(
                format!(
                    "Daily limit reached ({} URLs/day). Try again tomorrow.",
                    self.daily_limit
                ),
                json!({ "limit": self.daily_limit, "count": count }),
            ));
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockCacheService};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_sixth_attempt_rejected_until_window_expires() {
        let limiter = RateLimiter::new(Arc::new(MemoryCache::new()), DEFAULT_DAILY_LIMIT);

        for expected in 1..=5 {
            assert_eq!(limiter.enforce("203.0.113.7").await.unwrap(), expected);
        }

        let err = limiter.enforce("203.0.113.7").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));

        // Other clients are unaffected.
        assert_eq!(limiter.enforce("198.51.100.1").await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(WINDOW_SECONDS + 1)).await;

        assert_eq!(limiter.enforce("203.0.113.7").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expiry_set_only_on_first_increment() {
        let mut cache = MockCacheService::new();
        cache.expect_incr().times(1).returning(|_| Ok(2));
        cache.expect_expire().times(0);

        let limiter = RateLimiter::new(Arc::new(cache), DEFAULT_DAILY_LIMIT);
        assert_eq!(limiter.check("10.0.0.1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_first_increment_sets_window() {
        let mut cache = MockCacheService::new();
        cache
            .expect_incr()
            .withf(|key| key == "rate:10.0.0.1")
            .times(1)
            .returning(|_| Ok(1));
        cache
            .expect_expire()
            .withf(|key, secs| key == "rate:10.0.0.1" && *secs == WINDOW_SECONDS)
            .times(1)
            .returning(|_, _| Ok(()));

        let limiter = RateLimiter::new(Arc::new(cache), DEFAULT_DAILY_LIMIT);
        assert_eq!(limiter.check("10.0.0.1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cache_failure_fails_closed() {
        let mut cache = MockCacheService::new();
        cache
            .expect_incr()
            .returning(|_| Err(CacheError::Connection("refused".into())));

        let limiter = RateLimiter::new(Arc::new(cache), DEFAULT_DAILY_LIMIT);
        let err = limiter.enforce("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable { .. }));
    }
}
