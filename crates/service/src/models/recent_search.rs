//! Recent free-text searches.

use catalog_core::RecentSearchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A search term entered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub id: RecentSearchId,
    pub user_id: String,
    pub search_keyword: String,
    pub created_at: DateTime<Utc>,
}
