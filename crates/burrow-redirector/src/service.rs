use std::sync::Arc;

use async_trait::async_trait;
use burrow_core::store::with_deadline;
use burrow_core::{
    CachedDestination, Destination, EngineConfig, ReadMappingStore, Redirector, ResolutionCache,
    ResolutionError, ShortCode, UrlRecord,
};
use jiff::Timestamp;
use tracing::{debug, trace, warn};

type Result<T> = std::result::Result<T, ResolutionError>;

/// Service for resolving short codes.
///
/// Checks the resolution cache first and falls back to the mapping store,
/// filling the cache on a store hit. Unknown and expired codes are not
/// cached. The cache is best effort: a failing cache is logged and skipped,
/// never reported to the caller.
#[derive(Debug, Clone)]
pub struct ResolutionService<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    config: Arc<EngineConfig>,
}

impl<S: ReadMappingStore, C: ResolutionCache> ResolutionService<S, C> {
    pub fn new(store: S, cache: C, config: EngineConfig) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(cache), Arc::new(config))
    }

    /// Creates a service over a store shared with other components.
    pub fn from_shared(store: Arc<S>, cache: Arc<C>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolves a short code to its destination.
    ///
    /// * `Ok(Some(destination))` - the code exists and has not expired
    /// * `Ok(None)` - the code is unknown, deleted or expired
    /// * `Err(e)` - the store could not answer
    pub async fn resolve(&self, code: &ShortCode) -> Result<Option<Destination>> {
        Redirector::resolve(self, code).await
    }

    async fn cached(&self, code: &ShortCode, now: Timestamp) -> Option<CachedDestination> {
        let entry = match self.cache.get(code).await {
            Ok(entry) => entry?,
            Err(err) => {
                warn!(code = %code, error = %err, "cache lookup failed, reading the store");
                return None;
            }
        };

        if entry.is_expired_at(now) {
            debug!(code = %code, "cached record has expired");
            if let Err(err) = self.cache.invalidate(code).await {
                warn!(code = %code, error = %err, "failed to invalidate expired cache entry");
            }
            return None;
        }

        Some(entry)
    }

    /// Looks `code` up in the store, retrying transient failures.
    async fn load(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let policy = self.config.transient_retry;
        let mut retries = 0;

        loop {
            let result =
                with_deadline(self.config.store_timeout, "lookup", self.store.lookup(code)).await;

            match result {
                Ok(record) => return Ok(record),
                Err(err) if err.is_transient() && retries < policy.max_retries => {
                    retries += 1;
                    let delay = policy.delay_for(retries);
                    warn!(
                        code = %code,
                        retry = retries,
                        max_retries = policy.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient store failure during lookup, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_transient() => {
                    return Err(ResolutionError::TransientStoreFailure {
                        retries,
                        source: err,
                    });
                }
                Err(err) => return Err(ResolutionError::Storage(err)),
            }
        }
    }
}

#[async_trait]
impl<S: ReadMappingStore, C: ResolutionCache> Redirector for ResolutionService<S, C> {
    async fn resolve(&self, code: &ShortCode) -> Result<Option<Destination>> {
        trace!(code = %code, "resolving short code");
        let now = Timestamp::now();

        if let Some(entry) = self.cached(code, now).await {
            trace!(code = %code, "resolved from cache");
            return Ok(Some(entry.destination));
        }

        let Some(record) = self.load(code).await? else {
            trace!(code = %code, "short code not found");
            return Ok(None);
        };

        if record.is_expired_at(now) {
            debug!(code = %code, "record has expired");
            return Ok(None);
        }

        if let Err(err) = self.cache.put(code, CachedDestination::from(&record)).await {
            warn!(code = %code, error = %err, "failed to cache resolution");
        }

        debug!(code = %code, destination = %record.destination, "resolved short code");
        Ok(Some(record.destination))
    }
}
