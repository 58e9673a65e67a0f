//! Upstream catalog API clients.
//!
//! # Architecture
//!
//! - REST over `reqwest`, JSON bodies, bearer-token auth
//! - The catalog API is source of truth for products, categories and
//!   pricing; nothing fetched here is persisted
//! - The bearer token lives in a shared [`AccessCredential`] that a
//!   background task refreshes; every call reads the current value
//!
//! # APIs
//!
//! ## Catalog engine (`ORDERCLOUD_API_URL`)
//! - `v1/products`, `v1/products/{id}`
//! - `v1/catalogs/{catalog}/categories`
//! - `v1/catalogs/{catalog}/categories/productassignments`
//! - `v1/priceschedules`
//! - `oauth/token` (password grant)
//!
//! ## Seller-center middleware (`SELLER_CENTER_URL`)
//! - `products`, `products/{id}`, `products/Product_filter`
//!
//! Services depend on the [`CatalogApi`], [`PricingApi`] and
//! [`CredentialSource`] traits so they can run against fakes in tests.

mod auth;
mod client;
mod credential;

pub use auth::{AccessToken, PasswordGrant};
pub use client::OrderCloudClient;
pub use credential::AccessCredential;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CategoryAssignment, CategoryPage, PriceSchedulePage, Product, ProductPage, ProductPageV2,
    ProductV2,
};

/// Fields searched when a free-text search is present.
pub const PRODUCT_SEARCH_FIELDS: &str = "ID,Name,Description";

/// Errors that can occur when talking to the upstream catalog.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status. The body is discarded.
    #[error("failed to fetch {resource}")]
    Status {
        resource: &'static str,
        status: reqwest::StatusCode,
    },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured base URL could not be parsed.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Upstream returned no matching record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No access token has been obtained yet.
    #[error("no upstream access token available")]
    MissingCredential,
}

/// Filters for a product list request.
///
/// Empty values are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub catalog_id: Option<String>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub search: Option<String>,
    pub search_on: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Arbitrary `key=value` filters passed through to upstream.
    pub filters: BTreeMap<String, String>,
}

impl ProductQuery {
    /// Set or override a passthrough filter.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(key.into(), value.into());
    }

    /// Restrict the query to a set of product ids.
    pub fn restrict_to_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.set_filter("ID", pipe_join(ids));
    }

    /// Build query string parameters, using `default_catalog` when no catalog is set.
    #[must_use]
    pub fn to_params(&self, default_catalog: &str) -> Vec<(String, String)> {
        let catalog = self
            .catalog_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(default_catalog);

        let mut params = vec![("catalogID".to_string(), catalog.to_string())];
        push_non_empty(&mut params, "categoryID", self.category_id.as_deref());
        push_non_empty(&mut params, "supplierID", self.supplier_id.as_deref());
        push_non_empty(&mut params, "search", self.search.as_deref());
        push_non_empty(&mut params, "searchOn", self.search_on.as_deref());
        push_non_empty(&mut params, "sortBy", self.sort_by.as_deref());
        push_paging(&mut params, self.page, self.page_size);
        params.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        params
    }
}

/// Filters for a price schedule request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceScheduleQuery {
    pub search: Option<String>,
    pub search_on: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: BTreeMap<String, String>,
}

impl PriceScheduleQuery {
    /// Schedules whose id matches a single product id.
    #[must_use]
    pub fn for_product(product_id: &str) -> Self {
        Self {
            search: Some(product_id.to_string()),
            search_on: Some("ID".to_string()),
            ..Self::default()
        }
    }

    /// Schedules for a batch of product ids, without a page cap.
    #[must_use]
    pub fn for_products<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut filters = BTreeMap::new();
        filters.insert("ID".to_string(), pipe_join(ids));
        Self {
            filters,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push_non_empty(&mut params, "search", self.search.as_deref());
        push_non_empty(&mut params, "searchOn", self.search_on.as_deref());
        push_paging(&mut params, self.page, self.page_size);
        params.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        params
    }
}

/// Join ids into the upstream `a|b|c` filter syntax.
#[must_use]
pub fn pipe_join<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    ids.into_iter().collect::<Vec<_>>().join("|")
}

fn push_non_empty(params: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((key.to_string(), value.to_string()));
    }
}

fn push_paging(params: &mut Vec<(String, String)>, page: Option<u32>, page_size: Option<u32>) {
    if let Some(page) = page {
        params.push(("page".to_string(), page.to_string()));
    }
    if let Some(page_size) = page_size {
        params.push(("pageSize".to_string(), page_size.to_string()));
    }
}

/// Read access to the upstream catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// List catalog products.
    async fn products(&self, query: &ProductQuery) -> Result<ProductPage, UpstreamError>;

    /// Fetch a single catalog product.
    async fn product(&self, product_id: &str) -> Result<Product, UpstreamError>;

    /// List catalog products decoded into the seller-center shape.
    async fn products_as_v2(&self, query: &ProductQuery) -> Result<ProductPageV2, UpstreamError>;

    /// List products from the seller-center middleware.
    async fn products_v2(&self, query: &ProductQuery) -> Result<ProductPageV2, UpstreamError>;

    /// Fetch a single product from the seller-center middleware.
    async fn product_v2(&self, product_id: &str) -> Result<ProductV2, UpstreamError>;

    /// List the categories of a catalog as a flat sequence.
    async fn categories(
        &self,
        catalog_id: &str,
        depth: &str,
    ) -> Result<CategoryPage, UpstreamError>;

    /// First category assignment of a product.
    async fn category_assignment(
        &self,
        product_id: &str,
    ) -> Result<CategoryAssignment, UpstreamError>;

    /// Product filter facets from the seller-center middleware.
    async fn product_filters(&self, search: &str)
    -> Result<Vec<serde_json::Value>, UpstreamError>;
}

/// Read access to upstream price schedules.
#[async_trait]
pub trait PricingApi: Send + Sync {
    async fn price_schedules(
        &self,
        query: &PriceScheduleQuery,
    ) -> Result<PriceSchedulePage, UpstreamError>;
}

/// Source of fresh upstream access tokens.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken, UpstreamError>;
}
