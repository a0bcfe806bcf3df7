use async_trait::async_trait;
use burrow_core::cache::Result;
use burrow_core::{CachedDestination, EngineConfig, ResolutionCache, ShortCode};
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::time::Duration;
use tracing::trace;
use typed_builder::TypedBuilder;

/// An in-memory LRU cache of resolutions backed by Moka.
///
/// Size is bounded by entry count; once full, the least recently used entry
/// is evicted. Every entry also expires `ttl` after insertion, which bounds
/// how long a resolution can outlive an out-of-band delete. Recency
/// bookkeeping is buffered by Moka and applied in batches, so eviction under
/// contention is approximately LRU.
#[derive(Debug, Clone)]
pub struct MokaResolutionCache {
    cache: Cache<ShortCode, CachedDestination>,
}

/// Configuration for creating a [`MokaResolutionCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = 10_000)]
    max_entries: u64,
    /// Time-to-live for cache entries.
    #[builder(default = Duration::from_secs(300))]
    ttl: Duration,
}

impl From<&EngineConfig> for CacheConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_entries: config.cache_max_entries,
            ttl: config.cache_ttl,
        }
    }
}

impl From<CacheConfig> for MokaResolutionCache {
    fn from(config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { cache }
    }
}

impl MokaResolutionCache {
    /// Creates a cache with the given bounds.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        CacheConfig::builder()
            .max_entries(max_entries)
            .ttl(ttl)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }

    /// Approximate number of resident entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Applies pending recency updates, evictions and expirations now
    /// instead of on a later access.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for MokaResolutionCache {
    fn default() -> Self {
        CacheConfig::builder().build().into()
    }
}

#[async_trait]
impl ResolutionCache for MokaResolutionCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<CachedDestination>> {
        let entry = self.cache.get(code).await;
        if entry.is_some() {
            trace!(code = %code, "cache hit");
        } else {
            trace!(code = %code, "cache miss");
        }
        Ok(entry)
    }

    async fn put(&self, code: &ShortCode, entry: CachedDestination) -> Result<()> {
        self.cache.insert(code.clone(), entry).await;
        trace!(code = %code, "cached resolution");
        Ok(())
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<()> {
        self.cache.invalidate(code).await;
        trace!(code = %code, "invalidated cached resolution");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::Destination;
    use jiff::Timestamp;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn entry(url: &str) -> CachedDestination {
        CachedDestination {
            destination: Destination::from_trusted(url),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn get_and_put() {
        let cache = MokaResolutionCache::default();
        let c = code("abc123");

        assert!(cache.get(&c).await.unwrap().is_none());

        cache.put(&c, entry("https://example.com")).await.unwrap();

        assert_eq!(
            cache.get(&c).await.unwrap(),
            Some(entry("https://example.com"))
        );
    }

    #[tokio::test]
    async fn entry_keeps_record_expiry() {
        let cache = MokaResolutionCache::default();
        let c = code("abc123");
        let expires_at = Timestamp::now();
        let value = CachedDestination {
            destination: Destination::from_trusted("https://example.com"),
            expires_at: Some(expires_at),
        };

        cache.put(&c, value).await.unwrap();

        let got = cache.get(&c).await.unwrap().unwrap();
        assert_eq!(got.expires_at, Some(expires_at));
    }

    #[tokio::test]
    async fn invalidate_removes_entry_and_is_idempotent() {
        let cache = MokaResolutionCache::default();
        let c = code("abc123");

        cache.put(&c, entry("https://example.com")).await.unwrap();
        cache.invalidate(&c).await.unwrap();
        assert!(cache.get(&c).await.unwrap().is_none());

        cache.invalidate(&c).await.unwrap();
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let cache = MokaResolutionCache::new(2, Duration::from_secs(60));

        cache.put(&code("first"), entry("https://1.example")).await.unwrap();
        cache.put(&code("second"), entry("https://2.example")).await.unwrap();
        cache.run_pending_tasks().await;

        // touch "first" so "second" becomes the least recently used
        assert!(cache.get(&code("first")).await.unwrap().is_some());
        cache.run_pending_tasks().await;

        cache.put(&code("third"), entry("https://3.example")).await.unwrap();
        cache.run_pending_tasks().await;

        assert!(cache.get(&code("second")).await.unwrap().is_none());
        assert!(cache.get(&code("first")).await.unwrap().is_some());
        assert!(cache.get(&code("third")).await.unwrap().is_some());
        assert_eq!(cache.entry_count(), 2);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MokaResolutionCache::new(100, Duration::from_millis(50));
        let c = code("abc123");

        cache.put(&c, entry("https://example.com")).await.unwrap();
        assert!(cache.get(&c).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cache_from_engine_config() {
        let engine = EngineConfig::builder()
            .cache_max_entries(5)
            .cache_ttl(Duration::from_secs(1))
            .build();
        let cache: MokaResolutionCache = CacheConfig::from(&engine).into();

        for i in 0..20 {
            cache
                .put(&code(&format!("code{i}")), entry("https://example.com"))
                .await
                .unwrap();
        }
        cache.run_pending_tasks().await;

        assert!(cache.entry_count() <= 5);
    }
}
