// src/repositories/short_link.rs - Data access
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use sqlx::{FromRow, PgPool};

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::ShortLink;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepositoryTrait: Send + Sync {
    /// Inserts a short link if no link holds its code yet
    ///
    /// ### Returns
    /// * `Result<ShortLink>` - The stored record
    ///
    /// ### Errors
    /// * `RepositoryError::Duplicate` - If the code is already taken
    /// * `RepositoryError::Database` - If a database error occurs
    async fn create(&self, link: &ShortLink) -> Result<ShortLink>;

    /// Finds a short link by its code
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If a database error occurs
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Finds the earliest created short link pointing at `target`
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If a database error occurs
    async fn find_by_target(&self, target: &str) -> Result<Option<ShortLink>>;

    /// Atomically adds one to the hit counter of `code`
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link holds the code
    /// * `RepositoryError::Database` - If a database error occurs
    async fn increment_hits(&self, code: &str) -> Result<()>;
}

#[derive(Debug, FromRow)]
struct ShortLinkRow {
    code: String,
    target: String,
    hits: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ShortLinkRow> for ShortLink {
    type Error = RepositoryError;

    fn try_from(row: ShortLinkRow) -> Result<Self> {
        let hits = u64::try_from(row.hits).map_err(|_| {
            RepositoryError::InvalidData(format!(
                "negative hit count {} for code '{}'",
                row.hits, row.code
            ))
        })?;

        Ok(ShortLink {
            code: row.code,
            target: row.target,
            hits,
            created_at: row.created_at,
        })
    }
}

// Implementation using PostgreSQL
pub struct PostgresShortLinkRepository {
    pool: PgPool,
}

impl PostgresShortLinkRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl ShortLinkRepositoryTrait for PostgresShortLinkRepository {
    async fn create(&self, link: &ShortLink) -> Result<ShortLink> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
                INSERT INTO short_links (code, target, hits, created_at)
                VALUES ($1, $2, 0, $3)
                RETURNING code, target, hits, created_at
            "#,
        )
        .bind(&link.code)
        .bind(&link.target)
        .bind(link.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = RepositoryError::from(e);
            if !matches!(err, RepositoryError::Duplicate(_)) {
                error!("Failed to insert short link '{}': {}", link.code, err);
            }
            err
        })?;

        debug!("Inserted short link '{}'", row.code);
        row.try_into()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        sqlx::query_as::<_, ShortLinkRow>(
            r#"
                SELECT code, target, hits, created_at
                FROM short_links
                WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .map(ShortLink::try_from)
        .transpose()
    }

    async fn find_by_target(&self, target: &str) -> Result<Option<ShortLink>> {
        sqlx::query_as::<_, ShortLinkRow>(
            r#"
                SELECT code, target, hits, created_at
                FROM short_links
                WHERE target = $1
                ORDER BY id ASC
                LIMIT 1
            "#,
        )
        .bind(target)
        .fetch_optional(&self.pool)
        .await?
        .map(ShortLink::try_from)
        .transpose()
    }

    async fn increment_hits(&self, code: &str) -> Result<()> {
        let result = sqlx::query("UPDATE short_links SET hits = hits + 1 WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Short link '{}' not found",
                code
            )));
        }

        Ok(())
    }
}
