//! Trending product aggregation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::{RepositoryError, TrendingStore};
use crate::models::TrendingEntry;

/// `PostgreSQL` implementation of [`TrendingStore`].
#[derive(Debug, Clone)]
pub struct TrendingRepository {
    pool: PgPool,
}

impl TrendingRepository {
    /// Create a new trending repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrendingStore for TrendingRepository {
    #[instrument(skip(self))]
    async fn top_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TrendingEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, TrendingEntry>(
            r"
            SELECT product_id,
                   COUNT(product_id) AS order_count,
                   COALESCE(SUM(quantity), 0)::BIGINT AS quantity
            FROM catalog.trending_products
            WHERE created_at BETWEEN $1::date AND $2::date
            GROUP BY product_id
            ORDER BY order_count DESC
            LIMIT $3
            ",
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Aggregated trending products");
        Ok(rows)
    }
}
