//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::TtlCache;
use crate::config::CatalogDefaults;
use crate::db::{FavoriteRepository, FavoriteStore, RecentSearchRepository, RecentSearchStore};
use crate::ordercloud::{CatalogApi, OrderCloudClient, PricingApi};
use crate::services::{
    CategoryService, PriceScheduleService, ProductService, RecentSearchService,
};

/// Request-time services used by the route handlers.
#[derive(Clone)]
pub struct Services {
    pub categories: CategoryService,
    pub products: ProductService,
    pub price_schedules: PriceScheduleService,
    pub recent_searches: RecentSearchService,
}

impl Services {
    /// Wire the services to their collaborators.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        pricing: Arc<dyn PricingApi>,
        favorites: Arc<dyn FavoriteStore>,
        searches: Arc<dyn RecentSearchStore>,
        cache: TtlCache,
        defaults: CatalogDefaults,
    ) -> Self {
        Self {
            categories: CategoryService::new(Arc::clone(&catalog), defaults),
            products: ProductService::new(
                catalog,
                Arc::clone(&pricing),
                favorites,
                Arc::clone(&searches),
                cache,
            ),
            price_schedules: PriceScheduleService::new(pricing),
            recent_searches: RecentSearchService::new(searches),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and the services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    services: Services,
}

impl AppState {
    /// Create the production state: `PostgreSQL` stores and the upstream
    /// client for both catalog and pricing.
    #[must_use]
    pub fn new(
        pool: PgPool,
        client: OrderCloudClient,
        cache: TtlCache,
        defaults: CatalogDefaults,
    ) -> Self {
        let services = Services::new(
            Arc::new(client.clone()),
            Arc::new(client),
            Arc::new(FavoriteRepository::new(pool.clone())),
            Arc::new(RecentSearchRepository::new(pool.clone())),
            cache,
            defaults,
        );
        Self::with_services(pool, services)
    }

    /// Create a state around pre-built services.
    #[must_use]
    pub fn with_services(pool: PgPool, services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool, services }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryService {
        &self.inner.services.categories
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.services.products
    }

    #[must_use]
    pub fn price_schedules(&self) -> &PriceScheduleService {
        &self.inner.services.price_schedules
    }

    #[must_use]
    pub fn recent_searches(&self) -> &RecentSearchService {
        &self.inner.services.recent_searches
    }
}
