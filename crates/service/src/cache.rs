//! In-process TTL cache.
//!
//! Values are stored as serialized JSON so that entry cost is the encoded
//! size in bytes; the cache as a whole is bounded by a byte budget. Each
//! entry carries its own optional TTL.
//!
//! ```rust,ignore
//! let cache = TtlCache::new(512 * 1024 * 1024);
//! cache.set("trending_products", &entries, None).await?;
//! let cached: Option<Vec<TrendingEntry>> = cache.get("trending_products").await?;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors returned by [`TtlCache`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The admission policy refused the write.
    #[error("cache rejected value for key '{0}'")]
    Rejected(String),

    #[error("failed to encode cache value: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode cache value: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Clone)]
struct CachedValue {
    bytes: Arc<[u8]>,
    ttl: Option<Duration>,
}

struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Key/value cache with per-entry TTL and a byte budget.
///
/// Cheap to clone; clones share storage.
#[derive(Clone)]
pub struct TtlCache {
    inner: Cache<String, CachedValue>,
    max_cost: u64,
}

impl TtlCache {
    /// Create a cache bounded to `max_cost` bytes of encoded values.
    #[must_use]
    pub fn new(max_cost: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_cost)
            .weigher(|_key: &String, value: &CachedValue| -> u32 {
                u32::try_from(value.bytes.len()).unwrap_or(u32::MAX)
            })
            .expire_after(PerEntryTtl)
            .build();

        Self { inner, max_cost }
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Concurrent writers to the same key are serialized. Returns once the
    /// write is visible to subsequent reads.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Rejected` if the value does not fit the budget or
    /// was evicted by the admission policy, and `CacheError::Encode` if the
    /// value cannot be serialized.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes: Arc<[u8]> = serde_json::to_vec(value)
            .map_err(CacheError::Encode)?
            .into();

        let cost = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if cost > self.max_cost {
            return Err(CacheError::Rejected(key.to_owned()));
        }

        let value = CachedValue { bytes, ttl };
        self.inner
            .entry_by_ref(key)
            .and_upsert_with(|_| async move { value })
            .await;
        self.inner.run_pending_tasks().await;

        if self.inner.contains_key(key) {
            debug!(key, cost, "Cached value");
            Ok(())
        } else {
            Err(CacheError::Rejected(key.to_owned()))
        }
    }

    /// Read and decode the value under `key`. A miss returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Decode` if the stored value is not a `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(value) = self.inner.get(key).await else {
            return Ok(None);
        };
        serde_json::from_slice(&value.bytes)
            .map(Some)
            .map_err(CacheError::Decode)
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    /// Configured byte budget.
    #[must_use]
    pub const fn max_cost(&self) -> u64 {
        self.max_cost
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("max_cost", &self.max_cost)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = TtlCache::new(1024);
        cache.set("numbers", &vec![1, 2, 3], None).await.unwrap();

        let value: Option<Vec<i32>> = cache.get("numbers").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_miss_is_none() {
        let cache = TtlCache::new(1024);
        let value: Option<String> = cache.get("absent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = TtlCache::new(1024);
        cache.set("key", "first", None).await.unwrap();
        cache.set("key", "second", None).await.unwrap();

        let value: Option<String> = cache.get("key").await.unwrap();
        assert_eq!(value.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_value_over_budget_is_rejected() {
        let cache = TtlCache::new(8);
        let err = cache
            .set("big", "a string well over eight bytes", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::Rejected(ref key) if key == "big"));
        let value: Option<String> = cache.get("big").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_error() {
        let cache = TtlCache::new(1024);
        cache.set("key", "text", None).await.unwrap();

        let result: Result<Option<Vec<i32>>, _> = cache.get("key").await;
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new(1024);
        cache
            .set("short", &1, Some(Duration::from_millis(50)))
            .await
            .unwrap();
        cache.set("long", &2, None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        let short: Option<i32> = cache.get("short").await.unwrap();
        let long: Option<i32> = cache.get("long").await.unwrap();
        assert!(short.is_none());
        assert_eq!(long, Some(2));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let cache = TtlCache::new(1024);
        cache.set("a", &1, None).await.unwrap();
        cache.set("b", &2, None).await.unwrap();

        cache.clear().await;

        let a: Option<i32> = cache.get("a").await.unwrap();
        let b: Option<i32> = cache.get("b").await.unwrap();
        assert!(a.is_none() && b.is_none());
    }
}
