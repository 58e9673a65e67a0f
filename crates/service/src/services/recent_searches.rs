//! Recent search history.

use std::sync::Arc;

use catalog_core::PageRequest;
use tracing::instrument;

use super::ServiceError;
use crate::db::RecentSearchStore;
use crate::models::RecentSearch;

/// Serves a user's recent searches.
///
/// Searches are recorded by the product listing pipeline; this service only
/// reads them back.
#[derive(Clone)]
pub struct RecentSearchService {
    searches: Arc<dyn RecentSearchStore>,
}

impl RecentSearchService {
    #[must_use]
    pub fn new(searches: Arc<dyn RecentSearchStore>) -> Self {
        Self { searches }
    }

    /// A user's searches, newest first. Unbounded unless both `page` and
    /// `page_size` are given.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<RecentSearch>, ServiceError> {
        let page = PageRequest::from_parts(page, page_size);
        Ok(self.searches.list(user_id, page).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::services::testing::FakeSearches;

    #[tokio::test]
    async fn test_lists_newest_first() {
        let searches = FakeSearches::default();
        for keyword in ["apple", "mango", "durian"] {
            searches.save("u-1", keyword).await.unwrap();
        }
        searches.save("u-2", "kiwi").await.unwrap();
        let service = RecentSearchService::new(Arc::new(searches.clone()));

        let page = service.list("u-1", Some(1), Some(2)).await.unwrap();
        let keywords: Vec<&str> = page.iter().map(|s| s.search_keyword.as_str()).collect();
        assert_eq!(keywords, vec!["durian", "mango"]);
    }

    #[tokio::test]
    async fn test_partial_paging_is_unbounded() {
        let searches = FakeSearches::default();
        let service = RecentSearchService::new(Arc::new(searches.clone()));

        service.list("u-1", Some(3), None).await.unwrap();
        assert_eq!(searches.list_requests()[0].1, None);
    }
}
