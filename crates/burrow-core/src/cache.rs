use crate::destination::Destination;
use crate::error::CacheError;
use crate::record::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cached copy of the parts of a [`UrlRecord`] needed to redirect.
///
/// The record's own expiry travels with the entry so a cached copy never
/// outlives the record it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDestination {
    pub destination: Destination,
    pub expires_at: Option<Timestamp>,
}

impl CachedDestination {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

impl From<&UrlRecord> for CachedDestination {
    fn from(record: &UrlRecord) -> Self {
        Self {
            destination: record.destination.clone(),
            expires_at: record.expires_at,
        }
    }
}

/// A bounded read-through cache of short code resolutions.
///
/// The cache is never the source of truth: entries may be evicted at any time
/// and may be stale for at most the implementation's time-to-live.
#[async_trait]
pub trait ResolutionCache: Send + Sync + 'static {
    /// Returns the cached entry, or `Ok(None)` on a miss.
    async fn get(&self, code: &ShortCode) -> Result<Option<CachedDestination>>;

    /// Stores an entry filled from the mapping store.
    async fn put(&self, code: &ShortCode, entry: CachedDestination) -> Result<()>;

    /// Removes an entry. It is not an error if the key does not exist.
    async fn invalidate(&self, code: &ShortCode) -> Result<()>;
}
