use crate::error::StorageError;
use crate::record::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use std::future::Future;
use std::time::Duration;

/// Result type for mapping store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Outcome of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored under its code.
    Inserted,
    /// The code is already taken (live, expired or deleted). Nothing was written.
    AlreadyExists,
}

/// A read-only view of the mapping store.
///
/// The resolution path only needs lookups, so it depends on this trait alone.
#[async_trait]
pub trait ReadMappingStore: Send + Sync + 'static {
    /// Retrieves the record stored under `code`.
    ///
    /// Records whose `expires_at` has passed are still returned until they are
    /// swept; deleted records are not.
    async fn lookup(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;
}

/// The system of record for code to URL mappings.
///
/// A code, once inserted, is never assigned to another record, even after the
/// original expires or is deleted.
#[async_trait]
pub trait MappingStore: ReadMappingStore {
    /// Atomically stores `record` under `record.code` unless that code was ever
    /// used. Never overwrites.
    async fn try_insert(&self, record: UrlRecord) -> Result<InsertOutcome>;

    /// Hides the record for `code` from lookups while keeping the code
    /// reserved. Returns `true` if a live record was hidden.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;

    /// Deletes every live record that expired at or before `now`.
    /// Returns the number of records removed.
    async fn sweep_expired(&self, now: Timestamp) -> Result<u64>;
}

/// Durable named counters, so sequential codes survive restarts.
#[async_trait]
pub trait SequenceStore: Send + Sync + 'static {
    /// Reserves `size` consecutive values of `sequence` that were never
    /// reserved before and returns the first one. Sequences start at zero.
    async fn reserve(&self, sequence: &str, size: u64) -> Result<u64>;
}

/// Runs a store call with a deadline, mapping an elapsed deadline to
/// [`StorageError::Timeout`].
///
/// Dropping the returned future drops the inner call as well.
pub async fn with_deadline<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(format!(
            "{operation} did not complete within {}ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_deadline_passes_through_results() {
        let ok = with_deadline(Duration::from_secs(1), "lookup", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<()> = with_deadline(Duration::from_secs(1), "lookup", async {
            Err(StorageError::Query("boom".into()))
        })
        .await;
        assert!(matches!(err, Err(StorageError::Query(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn with_deadline_times_out() {
        let err: Result<()> = with_deadline(Duration::from_millis(10), "lookup", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(err, Err(StorageError::Timeout(_))));
    }
}
