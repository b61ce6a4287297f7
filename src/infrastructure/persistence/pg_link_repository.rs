//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for short link storage and retrieval.
///
/// Uses bound parameters for SQL injection protection.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ShortLinkRow {
    id: i64,
    original_url: String,
    short_code: String,
    creator_ip: String,
    clicks: i64,
    created_at: DateTime<Utc>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(r: ShortLinkRow) -> Self {
        ShortLink::new(
            r.id,
            r.original_url,
            r.short_code,
            r.creator_ip,
            r.clicks,
            r.created_at,
        )
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            INSERT INTO short_links (original_url, short_code, creator_ip)
            VALUES ($1, $2, $3)
            RETURNING id, original_url, short_code, creator_ip, clicks, created_at
            "#,
        )
        .bind(&new_link.original_url)
        .bind(&new_link.short_code)
        .bind(&new_link.creator_ip)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT id, original_url, short_code, creator_ip, clicks, created_at
            FROM short_links
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn set_clicks(&self, id: i64, clicks: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE short_links SET clicks = $2 WHERE id = $1")
            .bind(id)
            .bind(clicks)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                serde_json::json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn list_by_clicks(&self, offset: i64, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let rows = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT id, original_url, short_code, creator_ip, clicks, created_at
            FROM short_links
            ORDER BY clicks DESC, id ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM short_links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(total)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
