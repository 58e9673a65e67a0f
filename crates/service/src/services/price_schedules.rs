//! Price schedule lookups.

use std::sync::Arc;

use tracing::instrument;

use super::ServiceError;
use crate::models::PriceSchedulePage;
use crate::ordercloud::{PriceScheduleQuery, PricingApi};

/// Serves price schedules for a single product.
#[derive(Clone)]
pub struct PriceScheduleService {
    pricing: Arc<dyn PricingApi>,
}

impl PriceScheduleService {
    #[must_use]
    pub fn new(pricing: Arc<dyn PricingApi>) -> Self {
        Self { pricing }
    }

    /// Price schedules whose id matches `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Upstream` if the request fails.
    #[instrument(skip(self))]
    pub async fn price_schedules(
        &self,
        product_id: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PriceSchedulePage, ServiceError> {
        let query = PriceScheduleQuery {
            page,
            page_size,
            ..PriceScheduleQuery::for_product(product_id)
        };
        Ok(self.pricing.price_schedules(&query).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::ListPage;
    use crate::services::testing::{FakePricing, schedule};

    #[tokio::test]
    async fn test_searches_on_product_id_with_paging() {
        let pricing = FakePricing::default();
        pricing.set_schedules(ListPage::from_items(vec![schedule("p-1")]));
        let service = PriceScheduleService::new(Arc::new(pricing.clone()));

        let page = service
            .price_schedules("p-1", Some(2), Some(25))
            .await
            .unwrap();

        assert_eq!(page.items[0].id, "p-1");
        let sent = &pricing.requests()[0];
        assert_eq!(sent.search.as_deref(), Some("p-1"));
        assert_eq!(sent.search_on.as_deref(), Some("ID"));
        assert_eq!((sent.page, sent.page_size), (Some(2), Some(25)));
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let service = PriceScheduleService::new(Arc::new(FakePricing::default().failing()));
        let result = service.price_schedules("p-1", None, None).await;
        assert!(matches!(result, Err(ServiceError::Upstream(_))));
    }
}
