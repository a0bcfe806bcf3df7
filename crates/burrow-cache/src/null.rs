use async_trait::async_trait;
use burrow_core::cache::Result;
use burrow_core::{CachedDestination, ResolutionCache, ShortCode};

/// A cache that stores nothing. Used when caching is disabled, so every
/// resolution reads the mapping store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

#[async_trait]
impl ResolutionCache for NullCache {
    async fn get(&self, _code: &ShortCode) -> Result<Option<CachedDestination>> {
        Ok(None)
    }

    async fn put(&self, _code: &ShortCode, _entry: CachedDestination) -> Result<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &ShortCode) -> Result<()> {
        Ok(())
    }
}
