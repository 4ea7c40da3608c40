//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{InsertOutcome, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::db_error::{is_unique_violation_on, store_error};

const SHORT_CODE_CONSTRAINT: &str = "urls_short_code_key";

/// PostgreSQL repository for URL records.
///
/// Each method issues exactly one statement, so each primitive is atomic on
/// its own. Conflicts on `long_url` are absorbed with `ON CONFLICT DO NOTHING`
/// rather than by inspecting error messages.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert_placeholder(&self, long_url: &str) -> Result<InsertOutcome, AppError> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO urls (long_url, short_code, updated_at)
            VALUES ($1, NULL, NOW())
            ON CONFLICT (long_url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(store_error("insert_placeholder", long_url))?;

        Ok(match id {
            Some(id) => InsertOutcome::Inserted(id),
            None => InsertOutcome::AlreadyExists,
        })
    }

    async fn find_code_by_long_url(&self, long_url: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar(
            "SELECT short_code FROM urls WHERE long_url = $1 AND short_code IS NOT NULL",
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(store_error("find_code_by_long_url", long_url))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM urls WHERE short_code = $1)")
            .bind(code)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(store_error("code_exists", code))
    }

    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET short_code = $1, updated_at = NOW()
            WHERE id = $2 AND short_code IS NULL
            "#,
        )
        .bind(code)
        .bind(id)
        .execute(self.pool.as_ref())
        .await;

        let result = match result {
            Err(e) if is_unique_violation_on(&e, SHORT_CODE_CONSTRAINT) => {
                tracing::warn!(id, code, "Short code was taken between check and assignment");
                return Err(AppError::internal("Database error", json!({})));
            }
            other => other.map_err(store_error("assign_code", id))?,
        };

        if result.rows_affected() == 0 {
            tracing::error!(id, code, "Placeholder missing or already finalized");
            return Err(AppError::internal("Database error", json!({})));
        }

        Ok(())
    }

    async fn resolve_and_track(&self, code: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar(
            r#"
            UPDATE urls
            SET
                click_count = click_count + 1,
                last_accessed_at = NOW(),
                updated_at = NOW()
            WHERE short_code = $1
            RETURNING long_url
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(store_error("resolve_and_track", code))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_code, click_count, created_at, updated_at, last_accessed_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(store_error("find_by_code", code))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError> {
        sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_code, click_count, created_at, updated_at, last_accessed_at
            FROM urls
            WHERE short_code IS NOT NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(store_error("list", format!("limit={limit} offset={offset}")))
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE short_code IS NOT NULL")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(store_error("count", "-"))
    }

    async fn count_orphans(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE short_code IS NULL")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(store_error("count_orphans", "-"))
    }

    async fn delete_orphans(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM urls WHERE short_code IS NULL AND created_at < $1")
            .bind(older_than)
            .execute(self.pool.as_ref())
            .await
            .map_err(store_error("delete_orphans", older_than))?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(store_error("ping", "-"))?;

        Ok(())
    }
}
