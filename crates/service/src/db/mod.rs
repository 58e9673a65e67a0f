//! Database operations for the catalog `PostgreSQL` store.
//!
//! # Schema: `catalog`
//!
//! Stores local data only (the upstream catalog is source of truth for
//! products, categories and pricing):
//!
//! ## Tables
//!
//! - `user_product_favorites` - Products a user has marked as favorite
//! - `recent_searches` - Free-text searches entered by users
//! - `trending_products` - Ordered line items, aggregated by the trending refresher
//!
//! # Migrations
//!
//! Migrations are stored in `crates/service/migrations/` and run via:
//! ```bash
//! cargo run -p catalog-cli -- migrate
//! ```
//!
//! # Store traits
//!
//! Services depend on [`FavoriteStore`], [`RecentSearchStore`] and
//! [`TrendingStore`] rather than on the pool directly, so the pipelines can be
//! exercised against in-memory fakes.

pub mod favorites;
pub mod recent_searches;
pub mod trending;

use std::time::Duration;

use async_trait::async_trait;
use catalog_core::PageRequest;
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::{ProductFavorite, RecentSearch, TrendingEntry};

pub use favorites::FavoriteRepository;
pub use recent_searches::RecentSearchRepository;
pub use trending::TrendingRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., duplicate favorite).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Per-user product favorites.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// List a user's favorites. `None` returns every favorite.
    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductFavorite>, RepositoryError>;

    /// Mark a product as favorite, returning the stored row.
    async fn insert(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<ProductFavorite, RepositoryError>;

    /// Remove a favorite. Removing an absent favorite is not an error.
    async fn delete(&self, user_id: &str, product_id: &str) -> Result<(), RepositoryError>;
}

/// Per-user recent searches.
#[async_trait]
pub trait RecentSearchStore: Send + Sync {
    /// Persist a search term.
    async fn save(&self, user_id: &str, keyword: &str) -> Result<RecentSearch, RepositoryError>;

    /// List a user's searches, newest first. `None` returns every search.
    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<RecentSearch>, RepositoryError>;
}

/// Aggregated order statistics.
#[async_trait]
pub trait TrendingStore: Send + Sync {
    /// Top `limit` products by order count with `start <= created_at <= end`.
    async fn top_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TrendingEntry>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
