//! Trending product statistics.

use serde::{Deserialize, Serialize};

/// Aggregated order statistics for one product over the trending window.
///
/// Serialized into the in-process cache by the trending refresher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    /// Upstream catalog product ID.
    pub product_id: String,
    /// Number of order lines for the product.
    pub order_count: i64,
    /// Total quantity ordered.
    pub quantity: i64,
}
