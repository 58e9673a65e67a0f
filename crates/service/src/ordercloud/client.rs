//! REST client for the upstream catalog.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    AccessCredential, CatalogApi, PriceScheduleQuery, PricingApi, ProductQuery, UpstreamError,
};
use crate::config::{CatalogDefaults, OrderCloudConfig};
use crate::models::{
    CategoryAssignment, CategoryPage, ListPage, PriceSchedulePage, Product, ProductPage,
    ProductPageV2, ProductV2,
};

/// Per-request timeout for upstream calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the upstream catalog engine and seller-center middleware.
///
/// Cheap to clone. Every request reads the bearer token from the shared
/// [`AccessCredential`] at call time.
#[derive(Clone)]
pub struct OrderCloudClient {
    inner: Arc<OrderCloudClientInner>,
}

struct OrderCloudClientInner {
    client: reqwest::Client,
    api_url: Url,
    seller_center_url: Url,
    default_catalog_id: String,
    category_page_size: u32,
    credential: AccessCredential,
}

impl OrderCloudClient {
    /// Create a new upstream client.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Http` if the HTTP client cannot be built and
    /// `UpstreamError::InvalidUrl` if a base URL does not parse.
    pub fn new(
        config: &OrderCloudConfig,
        defaults: &CatalogDefaults,
        credential: AccessCredential,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(OrderCloudClientInner {
                client,
                api_url: Url::parse(&config.api_url)?,
                seller_center_url: Url::parse(&config.seller_center_url)?,
                default_catalog_id: defaults.catalog_id.clone(),
                category_page_size: defaults.category_page_size,
                credential,
            }),
        })
    }

    /// Underlying HTTP client, shared with the token source.
    #[must_use]
    pub fn http(&self) -> reqwest::Client {
        self.inner.client.clone()
    }

    /// Issue an authenticated GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(String, String)],
        resource: &'static str,
    ) -> Result<T, UpstreamError> {
        let token = self
            .inner
            .credential
            .current()
            .await
            .ok_or(UpstreamError::MissingCredential)?;

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, resource, "Upstream returned non-success status");
            return Err(UpstreamError::Status { resource, status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, resource, "Failed to decode upstream response");
            UpstreamError::Decode(e)
        })
    }

    fn engine_url(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        join_segments(&self.inner.api_url, segments)
    }

    fn seller_center_url(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        join_segments(&self.inner.seller_center_url, segments)
    }
}

/// Append path segments to `base`, percent-encoding each one.
///
/// Caller-supplied ids can never add or climb path levels: `/` and `?` are
/// encoded, and a bare `.` or `..` segment is refused.
fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, UpstreamError> {
    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || matches!(**s, "." | ".."))
    {
        return Err(UpstreamError::NotFound(format!("resource '{bad}'")));
    }

    let mut joined = base.clone();
    joined
        .path_segments_mut()
        .map_err(|()| {
            UpstreamError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(joined)
}

#[async_trait]
impl CatalogApi for OrderCloudClient {
    #[instrument(skip(self, query))]
    async fn products(&self, query: &ProductQuery) -> Result<ProductPage, UpstreamError> {
        let params = query.to_params(&self.inner.default_catalog_id);
        let page: ProductPage = self
            .get_json(self.engine_url(&["v1", "products"])?, &params, "products")
            .await?;
        debug!(count = page.items.len(), "Fetched products");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn product(&self, product_id: &str) -> Result<Product, UpstreamError> {
        let url = self.engine_url(&["v1", "products", product_id])?;
        self.get_json(url, &[], "product").await
    }

    #[instrument(skip(self, query))]
    async fn products_as_v2(&self, query: &ProductQuery) -> Result<ProductPageV2, UpstreamError> {
        let params = query.to_params(&self.inner.default_catalog_id);
        self.get_json(self.engine_url(&["v1", "products"])?, &params, "products")
            .await
    }

    #[instrument(skip(self, query))]
    async fn products_v2(&self, query: &ProductQuery) -> Result<ProductPageV2, UpstreamError> {
        let params = query.to_params(&self.inner.default_catalog_id);
        self.get_json(self.seller_center_url(&["products"])?, &params, "products")
            .await
    }

    #[instrument(skip(self))]
    async fn product_v2(&self, product_id: &str) -> Result<ProductV2, UpstreamError> {
        let url = self.seller_center_url(&["products", product_id])?;
        self.get_json(url, &[], "product").await
    }

    #[instrument(skip(self))]
    async fn categories(
        &self,
        catalog_id: &str,
        depth: &str,
    ) -> Result<CategoryPage, UpstreamError> {
        let url = self.engine_url(&["v1", "catalogs", catalog_id, "categories"])?;
        let params = [
            ("depth".to_string(), depth.to_string()),
            (
                "pageSize".to_string(),
                self.inner.category_page_size.to_string(),
            ),
        ];
        self.get_json(url, &params, "categories").await
    }

    #[instrument(skip(self))]
    async fn category_assignment(
        &self,
        product_id: &str,
    ) -> Result<CategoryAssignment, UpstreamError> {
        let url = self.engine_url(&[
            "v1",
            "catalogs",
            &self.inner.default_catalog_id,
            "categories",
            "productassignments",
        ])?;
        let params = [("productID".to_string(), product_id.to_string())];
        let page: ListPage<CategoryAssignment> = self
            .get_json(url, &params, "category product assignment")
            .await?;

        page.items.into_iter().next().ok_or_else(|| {
            UpstreamError::NotFound(format!("category assignment for product {product_id}"))
        })
    }

    #[instrument(skip(self))]
    async fn product_filters(
        &self,
        search: &str,
    ) -> Result<Vec<serde_json::Value>, UpstreamError> {
        let params = [("Search".to_string(), search.to_string())];
        self.get_json(
            self.seller_center_url(&["products", "Product_filter"])?,
            &params,
            "product filters",
        )
        .await
    }
}

#[async_trait]
impl PricingApi for OrderCloudClient {
    #[instrument(skip(self, query))]
    async fn price_schedules(
        &self,
        query: &PriceScheduleQuery,
    ) -> Result<PriceSchedulePage, UpstreamError> {
        let page: PriceSchedulePage = self
            .get_json(
                self.engine_url(&["v1", "priceschedules"])?,
                &query.to_params(),
                "price schedules",
            )
            .await?;
        debug!(count = page.items.len(), "Fetched price schedules");
        Ok(page)
    }
}
