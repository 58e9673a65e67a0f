//! Business logic services for the catalog aggregator.
//!
//! # Services
//!
//! - `categories` - Category hierarchy reconstruction
//! - `products` - Product enrichment pipeline (favorites, pricing) and favorite mutations
//! - `price_schedules` - Price schedule lookups
//! - `recent_searches` - Recent search history
//! - `trending` - Background refresher for the trending products cache
//! - `credentials` - Background refresher for the upstream access token
//!
//! Request-time services hold their collaborators as trait objects so the
//! pipelines can be exercised against the fakes in `testing`.

pub mod categories;
pub mod credentials;
pub mod price_schedules;
pub mod products;
pub mod recent_searches;
pub mod trending;

#[cfg(test)]
pub(crate) mod testing;

pub use categories::{CategoryService, build_category_tree};
pub use credentials::CredentialRefresher;
pub use price_schedules::PriceScheduleService;
pub use products::{ProductListRequest, ProductService};
pub use recent_searches::RecentSearchService;
pub use trending::{TRENDING_CACHE_KEY, TrendingRefresher, trending_window};

use thiserror::Error;

use crate::cache::CacheError;
use crate::db::RepositoryError;
use crate::ordercloud::UpstreamError;

/// Errors returned by the request-time services and refreshers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Upstream catalog call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Local store operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Cache write failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
