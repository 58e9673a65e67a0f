//! Trending products cache refresher.
//!
//! A single background task that recomputes the most-ordered products from
//! the local order statistics and writes them to the shared cache. Request
//! handlers only read the cached list (see `ProductService::trending_products`)
//! and never populate it.
//!
//! ```rust,ignore
//! let refresher = TrendingRefresher::new(store, cache.clone(), config.trending.clone());
//! let handle = tokio::spawn(refresher.run(shutdown.clone()));
//! ```

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use super::ServiceError;
use crate::cache::TtlCache;
use crate::config::TrendingConfig;
use crate::db::TrendingStore;

/// Cache key holding the trending list.
pub const TRENDING_CACHE_KEY: &str = "trending_products";

/// Date range counted as "trending" at `now`: yesterday through tomorrow
/// (UTC calendar dates, inclusive).
#[must_use]
pub fn trending_window(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let today = now.date_naive();
    let start = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let end = today.checked_add_days(Days::new(1)).unwrap_or(today);
    (start, end)
}

/// Periodically recomputes the trending products cache entry.
pub struct TrendingRefresher {
    store: Arc<dyn TrendingStore>,
    cache: TtlCache,
    config: TrendingConfig,
}

impl TrendingRefresher {
    #[must_use]
    pub fn new(store: Arc<dyn TrendingStore>, cache: TtlCache, config: TrendingConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Recompute the trending list once and overwrite the cache entry.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the statistics query fails and
    /// `ServiceError::Cache` if the cache refuses the entry. The previous
    /// entry is left in place in both cases.
    #[instrument(skip(self))]
    pub async fn refresh_once(&self) -> Result<usize, ServiceError> {
        let (start, end) = trending_window(Utc::now());
        let entries = self
            .store
            .top_products(start, end, self.config.limit)
            .await?;

        self.cache
            .set(TRENDING_CACHE_KEY, &entries, self.config.cache_ttl)
            .await?;

        debug!(%start, %end, count = entries.len(), "Trending products cached");
        Ok(entries.len())
    }

    /// Refresh immediately, then on every interval until `shutdown` fires.
    ///
    /// A failed refresh is logged and the loop continues with the next tick.
    /// A refresh already in progress when shutdown fires runs to completion.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            refresh_interval_secs = self.config.refresh_interval.as_secs(),
            limit = self.config.limit,
            "Trending refresher starting"
        );

        self.refresh_logged("initial").await;

        let mut interval = tokio::time::interval(self.config.refresh_interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("Trending refresher shutting down");
                    break;
                }

                _ = interval.tick() => {
                    self.refresh_logged("scheduled").await;
                }
            }
        }
    }

    async fn refresh_logged(&self, trigger: &'static str) {
        match self.refresh_once().await {
            Ok(count) => info!(trigger, count, "Refreshed trending products"),
            Err(e) => error!(trigger, error = %e, "Failed to refresh trending products"),
        }
    }
}
