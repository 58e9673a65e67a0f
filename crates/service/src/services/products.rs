//! Product enrichment pipeline.
//!
//! Every listing runs the same sequence, aborting on the first failure:
//!
//! 1. Load the user's favorites (bounded by the product page)
//! 2. Favorites-only requests restrict the query to those ids
//! 3. A search term is searched on `ID,Name,Description` and recorded
//! 4. `Active=true` is forced into the filters
//! 5. Query the upstream catalog
//! 6. Flag favorites
//! 7. Fetch price schedules for the returned ids in one request
//! 8. Attach each product's schedule
//!
//! Nothing here is cached; only the trending id list is read from the cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use catalog_core::PageRequest;
use tracing::{debug, instrument, warn};

use super::ServiceError;
use super::trending::TRENDING_CACHE_KEY;
use crate::cache::TtlCache;
use crate::db::{FavoriteStore, RecentSearchStore};
use crate::models::{
    PriceSchedule, PriceScheduleSummary, Product, ProductFavorite, ProductPage, ProductPageV2,
    ProductV2, TrendingEntry,
};
use crate::ordercloud::{
    CatalogApi, PRODUCT_SEARCH_FIELDS, PriceScheduleQuery, PricingApi, ProductQuery,
};

/// A product listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListRequest {
    /// Upstream filters, paging and search.
    pub query: ProductQuery,
    /// Only return the user's favorites.
    pub favorites_only: bool,
}

/// Serves enriched product listings and favorite mutations.
#[derive(Clone)]
pub struct ProductService {
    catalog: Arc<dyn CatalogApi>,
    pricing: Arc<dyn PricingApi>,
    favorites: Arc<dyn FavoriteStore>,
    searches: Arc<dyn RecentSearchStore>,
    cache: TtlCache,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        pricing: Arc<dyn PricingApi>,
        favorites: Arc<dyn FavoriteStore>,
        searches: Arc<dyn RecentSearchStore>,
        cache: TtlCache,
    ) -> Self {
        Self {
            catalog,
            pricing,
            favorites,
            searches,
            cache,
        }
    }

    /// List catalog products enriched with favorite flags and pricing.
    ///
    /// Favorites are loaded with the same page and page size as the product
    /// page. A favorites-only request for a user without favorites returns an
    /// empty page without calling upstream.
    ///
    /// # Errors
    ///
    /// Returns the first store, upstream or decode failure.
    #[instrument(skip(self, request), fields(favorites_only = request.favorites_only))]
    pub async fn products(
        &self,
        user_id: &str,
        request: ProductListRequest,
    ) -> Result<ProductPage, ServiceError> {
        let page = PageRequest::from_parts(request.query.page, request.query.page_size);
        let favorites = self.favorites.list(user_id, page).await?;

        let Some(query) = self
            .prepare_query(user_id, request, &favorites)
            .await?
        else {
            return Ok(ProductPage::default());
        };

        let mut products = self.catalog.products(&query).await?;
        mark_favorites(&mut products.items, &favorites);
        self.attach_price_schedules(&mut products.items).await?;

        debug!(count = products.items.len(), "Enriched products");
        Ok(products)
    }

    /// Fetch one product with its favorite flag and price schedule.
    ///
    /// # Errors
    ///
    /// Returns the first store, upstream or decode failure.
    #[instrument(skip(self))]
    pub async fn product(&self, user_id: &str, product_id: &str) -> Result<Product, ServiceError> {
        let favorites = self.favorites.list(user_id, None).await?;
        let mut product = self.catalog.product(product_id).await?;

        let favorite_ids = favorite_id_set(&favorites);
        product.is_favorite = favorite_ids.contains(product.id.as_str());

        let schedules = self
            .pricing
            .price_schedules(&PriceScheduleQuery::for_products([product_id]))
            .await?;
        product.price_schedule = schedules.items.into_iter().find(|s| s.id == product.id);

        Ok(product)
    }

    /// Products sharing the first category of `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::NotFound` (wrapped) if the product has no
    /// category, or the first store, upstream or decode failure.
    #[instrument(skip(self))]
    pub async fn similar_products(
        &self,
        user_id: &str,
        product_id: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ProductPage, ServiceError> {
        let assignment = self.catalog.category_assignment(product_id).await?;
        let favorites = self
            .favorites
            .list(user_id, PageRequest::from_parts(page, page_size))
            .await?;

        let mut query = ProductQuery {
            category_id: Some(assignment.category_id),
            page,
            page_size,
            ..ProductQuery::default()
        };
        force_active(&mut query);

        let mut products = self.catalog.products(&query).await?;
        mark_favorites(&mut products.items, &favorites);
        self.attach_price_schedules(&mut products.items).await?;

        Ok(products)
    }

    /// Products sharing the first category of `product_id`, in the
    /// seller-center shape with a reduced price schedule.
    ///
    /// Recommendations carry no favorite flags.
    ///
    /// # Errors
    ///
    /// Returns the first upstream or decode failure.
    #[instrument(skip(self))]
    pub async fn recommended_products(
        &self,
        product_id: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ProductPageV2, ServiceError> {
        let assignment = self.catalog.category_assignment(product_id).await?;

        let mut query = ProductQuery {
            category_id: Some(assignment.category_id),
            page,
            page_size,
            ..ProductQuery::default()
        };
        force_active(&mut query);

        let mut products = self.catalog.products_as_v2(&query).await?;
        if products.items.is_empty() {
            return Ok(products);
        }

        let schedules = self
            .fetch_schedules(products.items.iter().map(ProductV2::product_id))
            .await?;
        for product in &mut products.items {
            product.price_schedule = schedules
                .get(product.product_id())
                .cloned()
                .map(PriceScheduleSummary::from);
        }

        Ok(products)
    }

    /// List seller-center products with favorite flags.
    ///
    /// Seller-center products embed their own pricing, so no pricing request
    /// is made. Favorites are loaded without paging.
    ///
    /// # Errors
    ///
    /// Returns the first store, upstream or decode failure.
    #[instrument(skip(self, request), fields(favorites_only = request.favorites_only))]
    pub async fn products_v2(
        &self,
        user_id: &str,
        request: ProductListRequest,
    ) -> Result<ProductPageV2, ServiceError> {
        let favorites = self.favorites.list(user_id, None).await?;

        let Some(query) = self
            .prepare_query(user_id, request, &favorites)
            .await?
        else {
            return Ok(ProductPageV2::default());
        };

        let mut products = self.catalog.products_v2(&query).await?;
        mark_favorites_v2(&mut products.items, &favorites);

        Ok(products)
    }

    /// Fetch one seller-center product with its favorite flag.
    ///
    /// # Errors
    ///
    /// Returns the first store, upstream or decode failure.
    #[instrument(skip(self))]
    pub async fn product_v2(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<ProductV2, ServiceError> {
        let favorites = self.favorites.list(user_id, None).await?;
        let mut product = self.catalog.product_v2(product_id).await?;
        mark_favorites_v2(std::slice::from_mut(&mut product), &favorites);
        Ok(product)
    }

    /// Products currently in the trending cache.
    ///
    /// A missing or undecodable cache entry, or an empty trending list,
    /// yields an empty page without calling upstream. Reads never populate
    /// the cache.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure of the product request.
    #[instrument(skip(self))]
    pub async fn trending_products(&self) -> Result<ProductPage, ServiceError> {
        let entries = match self.cache.get::<Vec<TrendingEntry>>(TRENDING_CACHE_KEY).await {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                debug!("Trending cache is empty");
                return Ok(ProductPage::default());
            }
            Err(e) => {
                warn!(error = %e, "Unreadable trending cache entry");
                return Ok(ProductPage::default());
            }
        };

        if entries.is_empty() {
            return Ok(ProductPage::default());
        }

        let mut query = ProductQuery::default();
        query.restrict_to_ids(entries.iter().map(|e| e.product_id.as_str()));
        force_active(&mut query);

        Ok(self.catalog.products(&query).await?)
    }

    /// Product filter facets for a search term.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure.
    #[instrument(skip(self))]
    pub async fn product_filters(
        &self,
        search: &str,
    ) -> Result<Vec<serde_json::Value>, ServiceError> {
        Ok(self.catalog.product_filters(search).await?)
    }

    /// Mark a product as favorite (`Some`) or remove the mark (`None`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` (wrapped) when marking a product
    /// that is already a favorite.
    #[instrument(skip(self))]
    pub async fn set_favorite(
        &self,
        user_id: &str,
        product_id: &str,
        is_favorite: bool,
    ) -> Result<Option<ProductFavorite>, ServiceError> {
        if is_favorite {
            let favorite = self.favorites.insert(user_id, product_id).await?;
            Ok(Some(favorite))
        } else {
            self.favorites.delete(user_id, product_id).await?;
            Ok(None)
        }
    }

    /// Apply favorites-only restriction, search handling and the active
    /// filter. Returns `None` for a favorites-only request with no favorites.
    async fn prepare_query(
        &self,
        user_id: &str,
        request: ProductListRequest,
        favorites: &[ProductFavorite],
    ) -> Result<Option<ProductQuery>, ServiceError> {
        let ProductListRequest {
            mut query,
            favorites_only,
        } = request;

        if favorites_only {
            if favorites.is_empty() {
                debug!("No favorites for favorites-only request");
                return Ok(None);
            }
            query.restrict_to_ids(favorites.iter().map(|f| f.product_id.as_str()));
        }

        // A present but empty term is still recorded.
        if let Some(search) = query.search.as_deref() {
            self.searches.save(user_id, search).await?;
            query.search_on = Some(PRODUCT_SEARCH_FIELDS.to_string());
        }

        force_active(&mut query);
        Ok(Some(query))
    }

    /// One pricing request for every product, then attach matches.
    async fn attach_price_schedules(&self, products: &mut [Product]) -> Result<(), ServiceError> {
        // No ids to price on an empty page, so pricing is not consulted and
        // cannot fail the listing.
        if products.is_empty() {
            return Ok(());
        }

        let schedules = self
            .fetch_schedules(products.iter().map(|p| p.id.as_str()))
            .await?;
        for product in products {
            product.price_schedule = schedules.get(product.id.as_str()).cloned();
        }
        Ok(())
    }

    async fn fetch_schedules<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<String, PriceSchedule>, ServiceError> {
        let page = self
            .pricing
            .price_schedules(&PriceScheduleQuery::for_products(ids))
            .await?;
        Ok(page
            .items
            .into_iter()
            .map(|schedule| (schedule.id.clone(), schedule))
            .collect())
    }
}

/// Override any caller-supplied `Active` filter.
fn force_active(query: &mut ProductQuery) {
    query.set_filter("Active", "true");
}

fn favorite_id_set(favorites: &[ProductFavorite]) -> HashSet<&str> {
    favorites.iter().map(|f| f.product_id.as_str()).collect()
}

/// Set `is_favorite` on exactly the products whose id is a favorite.
pub(crate) fn mark_favorites(products: &mut [Product], favorites: &[ProductFavorite]) {
    let favorite_ids = favorite_id_set(favorites);
    for product in products {
        product.is_favorite = favorite_ids.contains(product.id.as_str());
    }
}

/// Flag the nested product record of seller-center products.
fn mark_favorites_v2(products: &mut [ProductV2], favorites: &[ProductFavorite]) {
    let favorite_ids = favorite_id_set(favorites);
    for product in products {
        if let Some(inner) = product.product.as_mut() {
            inner.is_favorite = favorite_ids.contains(inner.id.as_str());
        }
    }
}
