//! Repository trait for sampled click records.

use crate::domain::entities::{ClickDimension, ClickLog, NewClickLog, ValueCount};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage for sampled click details.
///
/// Writes come exclusively from the analytics sync; reads serve reporting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickLogRepository: Send + Sync {
    /// Records a sampled click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_log: NewClickLog) -> Result<ClickLog, AppError>;

    /// Counts sampled clicks, optionally for a single link.
    async fn count(&self, short_link_id: Option<i64>) -> Result<i64, AppError>;

    /// Returns the most recent sampled clicks of a link, newest first.
    async fn recent(&self, short_link_id: i64, limit: i64) -> Result<Vec<ClickLog>, AppError>;

    /// Groups all sampled clicks by `dimension`, most frequent first.
    ///
    /// Ties are broken by value so the ranking is stable. Missing values are
    /// reported under [`ClickDimension::fallback`].
    async fn top_values(
        &self,
        dimension: ClickDimension,
        limit: i64,
    ) -> Result<Vec<ValueCount>, AppError>;

    /// Most frequent `dimension` value among one link's sampled clicks, if it has any.
    async fn top_value(
        &self,
        short_link_id: i64,
        dimension: ClickDimension,
    ) -> Result<Option<String>, AppError>;
}
