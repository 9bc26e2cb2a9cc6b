//! PostgreSQL implementation of the resolved redirect repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewResolvedRedirect, ResolvedRedirect};
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ResolvedRedirectRow {
    short_url: String,
    resolved_url: String,
    created_at: DateTime<Utc>,
}

impl From<ResolvedRedirectRow> for ResolvedRedirect {
    fn from(row: ResolvedRedirectRow) -> Self {
        ResolvedRedirect::new(row.short_url, row.resolved_url, row.created_at)
    }
}

/// PostgreSQL repository for resolved redirects.
///
/// Inserts are upserts on the `short_url` primary key, which gives the
/// insert-or-replace semantics the resolution step relies on.
pub struct PgResolvedRedirectRepository {
    pool: Arc<PgPool>,
}

impl PgResolvedRedirectRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResolvedRedirectRepository for PgResolvedRedirectRepository {
    async fn lookup(&self, short_url: &str) -> Result<Option<String>, AppError> {
        let resolved = sqlx::query_scalar::<_, String>(
            "SELECT resolved_url FROM resolved_redirects WHERE short_url = $1",
        )
        .bind(short_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(resolved)
    }

    async fn find(&self, short_url: &str) -> Result<Option<ResolvedRedirect>, AppError> {
        let row = sqlx::query_as::<_, ResolvedRedirectRow>(
            r#"
            SELECT short_url, resolved_url, created_at
            FROM resolved_redirects
            WHERE short_url = $1
            "#,
        )
        .bind(short_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, entry: NewResolvedRedirect) -> Result<ResolvedRedirect, AppError> {
        let row = sqlx::query_as::<_, ResolvedRedirectRow>(
            r#"
            INSERT INTO resolved_redirects (short_url, resolved_url)
            VALUES ($1, $2)
            ON CONFLICT (short_url) DO UPDATE
                SET resolved_url = EXCLUDED.resolved_url,
                    created_at = NOW()
            RETURNING short_url, resolved_url, created_at
            "#,
        )
        .bind(&entry.short_url)
        .bind(&entry.resolved_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ResolvedRedirect>, AppError> {
        let rows = sqlx::query_as::<_, ResolvedRedirectRow>(
            r#"
            SELECT short_url, resolved_url, created_at
            FROM resolved_redirects
            ORDER BY created_at DESC, short_url
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resolved_redirects")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn delete(&self, short_url: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resolved_redirects WHERE short_url = $1")
            .bind(short_url)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM resolved_redirects")
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
