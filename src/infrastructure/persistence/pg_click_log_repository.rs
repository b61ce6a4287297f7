//! PostgreSQL implementation of click log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{ClickDimension, ClickLog, DeviceClass, NewClickLog, ValueCount};
use crate::domain::repositories::ClickLogRepository;
use crate::error::AppError;

/// PostgreSQL repository for sampled click details.
pub struct PgClickLogRepository {
    pool: Arc<PgPool>,
}

impl PgClickLogRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ClickLogRow {
    id: i64,
    short_link_id: i64,
    ip_address: String,
    user_agent: Option<String>,
    referrer: String,
    country: String,
    city: String,
    device: String,
    os: Option<String>,
    browser: Option<String>,
    clicked_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ClickLogRow {
    fn into_entity(self) -> ClickLog {
        // Rows written by older tooling may carry free-form device labels.
        let device = self.device.parse().unwrap_or(DeviceClass::Desktop);

        ClickLog {
            id: self.id,
            short_link_id: self.short_link_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            referrer: self.referrer,
            country: self.country,
            city: self.city,
            device,
            os: self.os,
            browser: self.browser,
            clicked_at: self.clicked_at,
            created_at: self.created_at,
        }
    }
}

const COLUMNS: &str = "id, short_link_id, ip_address, user_agent, referrer, country, city, \
                       device, os, browser, clicked_at, created_at";

#[async_trait]
impl ClickLogRepository for PgClickLogRepository {
    async fn create(&self, new_log: NewClickLog) -> Result<ClickLog, AppError> {
        let sql = format!(
            r#"
            INSERT INTO click_logs
                (short_link_id, ip_address, user_agent, referrer, country, city,
                 device, os, browser, clicked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ClickLogRow>(&sql)
            .bind(new_log.short_link_id)
            .bind(&new_log.ip_address)
            .bind(&new_log.user_agent)
            .bind(&new_log.referrer)
            .bind(&new_log.country)
            .bind(&new_log.city)
            .bind(new_log.device.as_str())
            .bind(&new_log.os)
            .bind(&new_log.browser)
            .bind(new_log.clicked_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into_entity())
    }

    async fn count(&self, short_link_id: Option<i64>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM click_logs WHERE ($1::BIGINT IS NULL OR short_link_id = $1)",
        )
        .bind(short_link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn recent(&self, short_link_id: i64, limit: i64) -> Result<Vec<ClickLog>, AppError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM click_logs
            WHERE short_link_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, ClickLogRow>(&sql)
            .bind(short_link_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ClickLogRow::into_entity).collect())
    }

    async fn top_values(
        &self,
        dimension: ClickDimension,
        limit: i64,
    ) -> Result<Vec<ValueCount>, AppError> {
        // Column names come from a closed enum, never from input.
        let sql = format!(
            r#"
            SELECT COALESCE(NULLIF({column}, ''), $1) AS value, COUNT(*) AS count
            FROM click_logs
            GROUP BY 1
            ORDER BY count DESC, value ASC
            LIMIT $2
            "#,
            column = dimension.column()
        );

        let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
            .bind(dimension.fallback())
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect())
    }

    async fn top_value(
        &self,
        short_link_id: i64,
        dimension: ClickDimension,
    ) -> Result<Option<String>, AppError> {
        let sql = format!(
            r#"
            SELECT COALESCE(NULLIF({column}, ''), $2) AS value
            FROM click_logs
            WHERE short_link_id = $1
            GROUP BY 1
            ORDER BY COUNT(*) DESC, value ASC
            LIMIT 1
            "#,
            column = dimension.column()
        );

        let value: Option<String> = sqlx::query_scalar(&sql)
            .bind(short_link_id)
            .bind(dimension.fallback())
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(value)
    }
}
