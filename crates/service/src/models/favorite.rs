//! User product favorites.

use catalog_core::FavoriteId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product marked as favorite by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductFavorite {
    /// Database ID of this favorite.
    pub id: FavoriteId,
    /// Subject of the user who owns the favorite.
    pub user_id: String,
    /// Upstream catalog product ID.
    pub product_id: String,
    /// When the product was marked.
    pub created_at: DateTime<Utc>,
}
