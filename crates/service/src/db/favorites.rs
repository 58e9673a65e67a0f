//! Favorite repository for database operations.

use async_trait::async_trait;
use catalog_core::PageRequest;
use sqlx::PgPool;
use tracing::instrument;

use super::{FavoriteStore, RepositoryError, conflict_on_unique};
use crate::models::ProductFavorite;

/// `PostgreSQL` implementation of [`FavoriteStore`].
#[derive(Debug, Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteStore for FavoriteRepository {
    #[instrument(skip(self), fields(paged = page.is_some()))]
    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductFavorite>, RepositoryError> {
        let rows = match page {
            Some(page) => {
                sqlx::query_as::<_, ProductFavorite>(
                    r"
                    SELECT id, user_id, product_id, created_at
                    FROM catalog.user_product_favorites
                    WHERE user_id = $1
                    ORDER BY id
                    LIMIT $2 OFFSET $3
                    ",
                )
                .bind(user_id)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductFavorite>(
                    r"
                    SELECT id, user_id, product_id, created_at
                    FROM catalog.user_product_favorites
                    WHERE user_id = $1
                    ORDER BY id
                    ",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn insert(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<ProductFavorite, RepositoryError> {
        sqlx::query_as::<_, ProductFavorite>(
            r"
            INSERT INTO catalog.user_product_favorites (user_id, product_id, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, user_id, product_id, created_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product is already a favorite"))
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str, product_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM catalog.user_product_favorites
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
