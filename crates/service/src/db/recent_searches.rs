//! Recent search repository.

use async_trait::async_trait;
use catalog_core::PageRequest;
use sqlx::PgPool;
use tracing::instrument;

use super::{RecentSearchStore, RepositoryError};
use crate::models::RecentSearch;

/// `PostgreSQL` implementation of [`RecentSearchStore`].
#[derive(Debug, Clone)]
pub struct RecentSearchRepository {
    pool: PgPool,
}

impl RecentSearchRepository {
    /// Create a new recent search repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecentSearchStore for RecentSearchRepository {
    #[instrument(skip(self))]
    async fn save(&self, user_id: &str, keyword: &str) -> Result<RecentSearch, RepositoryError> {
        let row = sqlx::query_as::<_, RecentSearch>(
            r"
            INSERT INTO catalog.recent_searches (user_id, search_keyword, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, user_id, search_keyword, created_at
            ",
        )
        .bind(user_id)
        .bind(keyword)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), fields(paged = page.is_some()))]
    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<RecentSearch>, RepositoryError> {
        let query = sqlx::query_as::<_, RecentSearch>(
            r"
            SELECT id, user_id, search_keyword, created_at
            FROM catalog.recent_searches
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id);

        // LIMIT NULL is unbounded in PostgreSQL.
        let rows = match page {
            Some(page) => query.bind(Some(page.limit())).bind(page.offset()),
            None => query.bind(None::<i64>).bind(0_i64),
        }
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
