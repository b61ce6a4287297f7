//! Cache service trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache command error: {0}")]
    Command(String),

    #[error("Cache operation timed out")]
    Timeout,

    #[error("Cache value for {key} is invalid: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value, counter and list primitives backed by the fast cache.
///
/// This is the only channel through which the redirect path, the rate limiter and
/// the analytics worker touch shared state. Implementations must be thread-safe and
/// must map every operation onto a single atomic cache command; `incr` in
/// particular is what keeps click counters exact under concurrent redirects.
///
/// Errors are returned to the caller. Whether a failure is fatal, fails open or is
/// silently dropped is a decision of the calling component, not of the cache.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process cache for development and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// `GET key`. Returns `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// `SET key value` without expiry.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// `SET key value NX EX seconds`. Returns `true` when the key was written.
    async fn set_nx_ex(&self, key: &str, value: &str, seconds: u64) -> CacheResult<bool>;

    /// `DEL key`.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Deletes `key` only while it still holds `value`, as one atomic step.
    /// Returns `true` when the key was deleted.
    async fn del_if_eq(&self, key: &str, value: &str) -> CacheResult<bool>;

    /// `INCR key`. Returns the post-increment value; a missing key starts at 0.
    async fn incr(&self, key: &str) -> CacheResult<i64>;

    /// `EXPIRE key seconds`.
    async fn expire(&self, key: &str, seconds: u64) -> CacheResult<()>;

    /// `RPUSH key value`. Returns the list length after the push.
    async fn rpush(&self, key: &str, value: &str) -> CacheResult<u64>;

    /// `LRANGE key start stop` with Redis index semantics (inclusive, negative from the tail).
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>>;

    /// `LTRIM key start stop` with Redis index semantics.
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> CacheResult<()>;

    /// `LLEN key`.
    async fn llen(&self, key: &str) -> CacheResult<u64>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
