//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage for short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link with `clicks = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Overwrites the durable click total of a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_clicks(&self, id: i64, clicks: i64) -> Result<(), AppError>;

    /// Lists links by durable click total, highest first.
    async fn list_by_clicks(&self, offset: i64, limit: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Counts all links.
    async fn count(&self) -> Result<i64, AppError>;

    /// Sums the durable click totals of all links.
    async fn total_clicks(&self) -> Result<i64, AppError>;

    /// Round-trips to the store; used by the health check.
    async fn ping(&self) -> Result<(), AppError>;
}
