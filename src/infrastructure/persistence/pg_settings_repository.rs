//! PostgreSQL implementation of settings repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;

/// Settings are a single row keyed by `id = 1`.
const SETTINGS_ROW: i16 = 1;

pub struct PgSettingsRepository {
    pool: Arc<PgPool>,
}

impl PgSettingsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn ad_redirect_url(&self) -> Result<Option<String>, AppError> {
        let url: Option<Option<String>> =
            sqlx::query_scalar("SELECT ad_redirect_url FROM admin_settings WHERE id = $1")
                .bind(SETTINGS_ROW)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(url.flatten())
    }

    async fn set_ad_redirect_url(&self, url: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO admin_settings (id, ad_redirect_url, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE
            SET ad_redirect_url = EXCLUDED.ad_redirect_url,
                updated_at = NOW()
            "#,
        )
        .bind(SETTINGS_ROW)
        .bind(url)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
