//! Integration tests for the catalog aggregator.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-integration-tests
//! ```
//!
//! No database or upstream is required: upstream APIs are served by a local
//! `mockito` server and the local stores by the in-memory implementations
//! below.
//!
//! # Test Categories
//!
//! - `category_tree` - Tree reconstruction properties over generated catalogs
//! - `ttl_cache` - Cache facade semantics under concurrency
//! - `enrichment` - Product pipeline against a mocked upstream

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::{FavoriteId, PageRequest, RecentSearchId};
use catalog_service::config::{CatalogDefaults, OrderCloudConfig};
use catalog_service::db::{FavoriteStore, RecentSearchStore, RepositoryError, TrendingStore};
use catalog_service::models::{Category, ProductFavorite, RecentSearch, TrendingEntry};
use catalog_service::ordercloud::{AccessCredential, OrderCloudClient};
use chrono::{NaiveDate, Utc};
use secrecy::SecretString;

/// Bearer token carried by [`upstream_client`].
pub const TEST_TOKEN: &str = "integration-token";

/// Upstream client pointed at a mock server, with a token already set.
///
/// The seller-center base URL is `<server>/seller`.
pub fn upstream_client(server_url: &str) -> OrderCloudClient {
    let config = OrderCloudConfig {
        api_url: server_url.to_string(),
        seller_center_url: format!("{server_url}/seller"),
        client_id: "integration-client".to_string(),
        client_secret: SecretString::from("integration-secret"),
        username: "integration-user".to_string(),
        password: SecretString::from("integration-password"),
        token_refresh_interval: Duration::from_secs(600),
    };
    let credential = AccessCredential::with_token(SecretString::from(TEST_TOKEN));
    OrderCloudClient::new(&config, &CatalogDefaults::default(), credential).unwrap()
}

/// Build a category record.
pub fn category(id: &str, parent: Option<&str>, child_count: u32) -> Category {
    Category {
        id: id.to_string(),
        parent_id: parent.map(str::to_string),
        child_count,
        ..Category::default()
    }
}

fn page_slice<T: Clone>(rows: &[T], page: Option<PageRequest>) -> Vec<T> {
    match page {
        Some(page) => rows
            .iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .cloned()
            .collect(),
        None => rows.to_vec(),
    }
}

/// In-memory [`FavoriteStore`].
#[derive(Default)]
pub struct MemoryFavorites {
    rows: Mutex<Vec<ProductFavorite>>,
}

#[async_trait]
impl FavoriteStore for MemoryFavorites {
    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductFavorite>, RepositoryError> {
        let rows: Vec<ProductFavorite> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_slice(&rows, page))
    }

    async fn insert(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<ProductFavorite, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|f| f.user_id == user_id && f.product_id == product_id)
        {
            return Err(RepositoryError::Conflict(
                "product is already a favorite".to_string(),
            ));
        }
        let row = ProductFavorite {
            id: FavoriteId::new(i32::try_from(rows.len()).unwrap() + 1),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, user_id: &str, product_id: &str) -> Result<(), RepositoryError> {
        self.rows
            .lock()
            .unwrap()
            .retain(|f| !(f.user_id == user_id && f.product_id == product_id));
        Ok(())
    }
}

/// In-memory [`RecentSearchStore`].
#[derive(Default)]
pub struct MemorySearches {
    rows: Mutex<Vec<RecentSearch>>,
}

#[async_trait]
impl RecentSearchStore for MemorySearches {
    async fn save(&self, user_id: &str, keyword: &str) -> Result<RecentSearch, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = RecentSearch {
            id: RecentSearchId::new(i32::try_from(rows.len()).unwrap() + 1),
            user_id: user_id.to_string(),
            search_keyword: keyword.to_string(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<RecentSearch>, RepositoryError> {
        let rows: Vec<RecentSearch> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_slice(&rows, page))
    }
}

/// In-memory [`TrendingStore`] returning pre-ranked entries.
#[derive(Default)]
pub struct MemoryTrending {
    entries: Mutex<Vec<TrendingEntry>>,
}

impl MemoryTrending {
    pub fn set(&self, entries: Vec<TrendingEntry>) {
        *self.entries.lock().unwrap() = entries;
    }
}

#[async_trait]
impl TrendingStore for MemoryTrending {
    async fn top_products(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TrendingEntry>, RepositoryError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }
}
