//! In-memory collaborators for service tests.
//!
//! Each fake shares its state between clones, so a test can hand one clone
//! to a service and inspect the recorded calls through another.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::{FavoriteId, PageRequest, RecentSearchId};
use chrono::{NaiveDate, Utc};
use secrecy::SecretString;

use crate::db::{FavoriteStore, RecentSearchStore, RepositoryError, TrendingStore};
use crate::models::{
    CategoryAssignment, CategoryPage, PriceSchedule, PriceSchedulePage, Product,
    ProductFavorite, ProductPage, ProductPageV2, ProductV2, RecentSearch, TrendingEntry,
};
use crate::ordercloud::{
    AccessToken, CatalogApi, CredentialSource, PriceScheduleQuery, PricingApi, ProductQuery,
    UpstreamError,
};

fn bad_gateway(resource: &'static str) -> UpstreamError {
    UpstreamError::Status {
        resource,
        status: reqwest::StatusCode::BAD_GATEWAY,
    }
}

fn paged<T: Clone>(items: &[T], page: Option<PageRequest>) -> Vec<T> {
    match page {
        Some(page) => items
            .iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .cloned()
            .collect(),
        None => items.to_vec(),
    }
}

pub fn product(id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: Some(format!("Product {id}")),
        active: Some(true),
        ..Product::default()
    }
}

pub fn product_v2(id: &str) -> ProductV2 {
    ProductV2 {
        id: id.to_string(),
        product: Some(product(id)),
        ..ProductV2::default()
    }
}

pub fn schedule(id: &str) -> PriceSchedule {
    PriceSchedule {
        id: id.to_string(),
        name: Some(format!("Schedule {id}")),
        ..PriceSchedule::default()
    }
}

pub fn favorite(user_id: &str, product_id: &str) -> ProductFavorite {
    ProductFavorite {
        id: FavoriteId::new(0),
        user_id: user_id.to_string(),
        product_id: product_id.to_string(),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Default)]
struct CatalogState {
    fail: bool,
    products: ProductPage,
    product: Option<Product>,
    products_v2: ProductPageV2,
    product_v2: Option<ProductV2>,
    categories: CategoryPage,
    assignments: Vec<CategoryAssignment>,
    filters: Vec<serde_json::Value>,
    product_queries: Vec<ProductQuery>,
    category_requests: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    /// Every call fails with a bad-gateway status.
    pub fn failing(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    pub fn with_categories(self, page: CategoryPage) -> Self {
        self.state.lock().unwrap().categories = page;
        self
    }

    pub fn set_products(&self, page: ProductPage) {
        self.state.lock().unwrap().products = page;
    }

    pub fn set_product(&self, product: Product) {
        self.state.lock().unwrap().product = Some(product);
    }

    pub fn set_products_v2(&self, page: ProductPageV2) {
        self.state.lock().unwrap().products_v2 = page;
    }

    pub fn set_product_v2(&self, product: ProductV2) {
        self.state.lock().unwrap().product_v2 = Some(product);
    }

    pub fn set_assignment(&self, product_id: &str, category_id: &str) {
        self.state.lock().unwrap().assignments.push(CategoryAssignment {
            category_id: category_id.to_string(),
            product_id: product_id.to_string(),
            list_order: 0,
        });
    }

    pub fn set_filters(&self, filters: Vec<serde_json::Value>) {
        self.state.lock().unwrap().filters = filters;
    }

    /// Every product list query, in call order.
    pub fn product_queries(&self) -> Vec<ProductQuery> {
        self.state.lock().unwrap().product_queries.clone()
    }

    pub fn category_requests(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().category_requests.clone()
    }

    fn check(&self, resource: &'static str) -> Result<(), UpstreamError> {
        if self.state.lock().unwrap().fail {
            Err(bad_gateway(resource))
        } else {
            Ok(())
        }
    }

    fn record(&self, query: &ProductQuery) {
        self.state
            .lock()
            .unwrap()
            .product_queries
            .push(query.clone());
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn products(&self, query: &ProductQuery) -> Result<ProductPage, UpstreamError> {
        self.record(query);
        self.check("products")?;
        Ok(self.state.lock().unwrap().products.clone())
    }

    async fn product(&self, product_id: &str) -> Result<Product, UpstreamError> {
        self.check("product")?;
        self.state
            .lock()
            .unwrap()
            .product
            .clone()
            .filter(|p| p.id == product_id)
            .ok_or_else(|| UpstreamError::NotFound(product_id.to_string()))
    }

    async fn products_as_v2(&self, query: &ProductQuery) -> Result<ProductPageV2, UpstreamError> {
        self.record(query);
        self.check("products")?;
        Ok(self.state.lock().unwrap().products_v2.clone())
    }

    async fn products_v2(&self, query: &ProductQuery) -> Result<ProductPageV2, UpstreamError> {
        self.record(query);
        self.check("products")?;
        Ok(self.state.lock().unwrap().products_v2.clone())
    }

    async fn product_v2(&self, product_id: &str) -> Result<ProductV2, UpstreamError> {
        self.check("product")?;
        self.state
            .lock()
            .unwrap()
            .product_v2
            .clone()
            .filter(|p| p.id == product_id)
            .ok_or_else(|| UpstreamError::NotFound(product_id.to_string()))
    }

    async fn categories(
        &self,
        catalog_id: &str,
        depth: &str,
    ) -> Result<CategoryPage, UpstreamError> {
        self.state
            .lock()
            .unwrap()
            .category_requests
            .push((catalog_id.to_string(), depth.to_string()));
        self.check("categories")?;
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn category_assignment(
        &self,
        product_id: &str,
    ) -> Result<CategoryAssignment, UpstreamError> {
        self.check("category assignments")?;
        self.state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .find(|a| a.product_id == product_id)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(format!("category for product {product_id}")))
    }

    async fn product_filters(
        &self,
        _search: &str,
    ) -> Result<Vec<serde_json::Value>, UpstreamError> {
        self.check("product filters")?;
        Ok(self.state.lock().unwrap().filters.clone())
    }
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Default)]
struct PricingState {
    fail: bool,
    schedules: PriceSchedulePage,
    requests: Vec<PriceScheduleQuery>,
}

#[derive(Clone, Default)]
pub struct FakePricing {
    state: Arc<Mutex<PricingState>>,
}

impl FakePricing {
    pub fn failing(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    pub fn set_schedules(&self, page: PriceSchedulePage) {
        self.state.lock().unwrap().schedules = page;
    }

    pub fn requests(&self) -> Vec<PriceScheduleQuery> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl PricingApi for FakePricing {
    async fn price_schedules(
        &self,
        query: &PriceScheduleQuery,
    ) -> Result<PriceSchedulePage, UpstreamError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(query.clone());
        if state.fail {
            return Err(bad_gateway("price schedules"));
        }
        Ok(state.schedules.clone())
    }
}

// =============================================================================
// Favorites
// =============================================================================

#[derive(Default)]
struct FavoritesState {
    rows: Vec<ProductFavorite>,
    next_id: i32,
    list_requests: Vec<(String, Option<PageRequest>)>,
}

#[derive(Clone, Default)]
pub struct FakeFavorites {
    state: Arc<Mutex<FavoritesState>>,
}

impl FakeFavorites {
    pub fn add(&self, favorite: ProductFavorite) {
        self.state.lock().unwrap().rows.push(favorite);
    }

    pub fn list_requests(&self) -> Vec<(String, Option<PageRequest>)> {
        self.state.lock().unwrap().list_requests.clone()
    }

    pub fn product_ids(&self, user_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.product_id.clone())
            .collect()
    }
}

#[async_trait]
impl FavoriteStore for FakeFavorites {
    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<ProductFavorite>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.list_requests.push((user_id.to_string(), page));
        let owned: Vec<ProductFavorite> = state
            .rows
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        Ok(paged(&owned, page))
    }

    async fn insert(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<ProductFavorite, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state
            .rows
            .iter()
            .any(|f| f.user_id == user_id && f.product_id == product_id)
        {
            return Err(RepositoryError::Conflict(
                "product is already a favorite".to_string(),
            ));
        }
        state.next_id += 1;
        let row = ProductFavorite {
            id: FavoriteId::new(state.next_id),
            ..favorite(user_id, product_id)
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, user_id: &str, product_id: &str) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .unwrap()
            .rows
            .retain(|f| !(f.user_id == user_id && f.product_id == product_id));
        Ok(())
    }
}

// =============================================================================
// Recent searches
// =============================================================================

#[derive(Default)]
struct SearchesState {
    fail: bool,
    rows: Vec<RecentSearch>,
    list_requests: Vec<(String, Option<PageRequest>)>,
}

#[derive(Clone, Default)]
pub struct FakeSearches {
    state: Arc<Mutex<SearchesState>>,
}

impl FakeSearches {
    /// Make every subsequent call fail.
    pub fn fail(&self) {
        self.state.lock().unwrap().fail = true;
    }

    /// Saved `(user, keyword)` pairs, oldest first.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .map(|s| (s.user_id.clone(), s.search_keyword.clone()))
            .collect()
    }

    pub fn list_requests(&self) -> Vec<(String, Option<PageRequest>)> {
        self.state.lock().unwrap().list_requests.clone()
    }
}

#[async_trait]
impl RecentSearchStore for FakeSearches {
    async fn save(&self, user_id: &str, keyword: &str) -> Result<RecentSearch, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let id = i32::try_from(state.rows.len()).unwrap() + 1;
        let row = RecentSearch {
            id: RecentSearchId::new(id),
            user_id: user_id.to_string(),
            search_keyword: keyword.to_string(),
            created_at: Utc::now(),
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<RecentSearch>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.list_requests.push((user_id.to_string(), page));
        if state.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let owned: Vec<RecentSearch> = state
            .rows
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(paged(&owned, page))
    }
}

// =============================================================================
// Trending
// =============================================================================

#[derive(Default)]
struct TrendingState {
    fail: bool,
    entries: Vec<TrendingEntry>,
    requests: Vec<(NaiveDate, NaiveDate, i64)>,
}

#[derive(Clone, Default)]
pub struct FakeTrending {
    state: Arc<Mutex<TrendingState>>,
}

impl FakeTrending {
    pub fn set_entries(&self, entries: Vec<TrendingEntry>) {
        self.state.lock().unwrap().entries = entries;
    }

    pub fn set_failing(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }

    /// Every `(start, end, limit)` query, in call order.
    pub fn requests(&self) -> Vec<(NaiveDate, NaiveDate, i64)> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl TrendingStore for FakeTrending {
    async fn top_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TrendingEntry>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((start, end, limit));
        if state.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.entries.iter().take(limit).cloned().collect())
    }
}

// =============================================================================
// Credentials
// =============================================================================

#[derive(Default)]
struct CredentialState {
    calls: usize,
    /// Call numbers (1-based) that fail.
    failing_calls: Vec<usize>,
}

#[derive(Clone, Default)]
pub struct FakeCredentialSource {
    state: Arc<Mutex<CredentialState>>,
}

impl FakeCredentialSource {
    /// Fail the `n`th fetch (1-based).
    pub fn fail_call(&self, n: usize) {
        self.state.lock().unwrap().failing_calls.push(n);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl CredentialSource for FakeCredentialSource {
    /// Returns `token-<n>` for the `n`th call.
    async fn fetch(&self) -> Result<AccessToken, UpstreamError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let call = state.calls;
        if state.failing_calls.contains(&call) {
            return Err(bad_gateway("access token"));
        }
        Ok(AccessToken {
            access_token: SecretString::from(format!("token-{call}")),
            expires_in: Duration::from_secs(36_000).as_secs(),
        })
    }
}
