//! Repository trait for admin settings.

use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage for the singleton admin settings row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the stored ad redirect URL, if the settings row exists.
    async fn ad_redirect_url(&self) -> Result<Option<String>, AppError>;

    /// Creates or updates the ad redirect URL.
    async fn set_ad_redirect_url(&self, url: &str) -> Result<(), AppError>;
}
