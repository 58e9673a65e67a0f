//! Domain models for the catalog aggregator.
//!
//! Upstream records (products, categories, price schedules) mirror the
//! catalog API's `PascalCase` JSON and keep unknown fields so they can be
//! returned to clients untouched. Local records (favorites, recent searches,
//! trending statistics) map onto `PostgreSQL` rows.

pub mod category;
pub mod favorite;
pub mod price_schedule;
pub mod product;
pub mod recent_search;
pub mod trending;

use serde::{Deserialize, Serialize};

pub use category::{Category, CategoryAssignment};
pub use favorite::ProductFavorite;
pub use price_schedule::{PriceBreak, PriceSchedule, PriceScheduleSummary};
pub use product::{Product, ProductV2};
pub use recent_search::RecentSearch;
pub use trending::TrendingEntry;

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub item_range: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_key: Option<String>,
}

/// A page of items from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPage<T> {
    #[serde(default)]
    pub meta: ListMeta,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            meta: ListMeta::default(),
            items: Vec::new(),
        }
    }
}

impl<T> ListPage<T> {
    /// Create a page holding `items` with default metadata.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            meta: ListMeta::default(),
            items,
        }
    }
}

/// A page of catalog products.
pub type ProductPage = ListPage<Product>;

/// A page of seller-center products.
pub type ProductPageV2 = ListPage<ProductV2>;

/// A page of price schedules.
pub type PriceSchedulePage = ListPage<PriceSchedule>;

/// A page of categories.
pub type CategoryPage = ListPage<Category>;
