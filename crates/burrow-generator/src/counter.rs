use async_trait::async_trait;
use burrow_core::store::Result;
use burrow_core::SequenceStore;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Sequence name used for short code counters.
pub const DEFAULT_SEQUENCE: &str = "short_code";

/// A source of never-repeating counter values.
#[async_trait]
pub trait CounterSource: Send + Sync + 'static {
    async fn next_value(&self) -> Result<u64>;
}

/// An in-process monotonically increasing counter.
///
/// Values only stay unique for the lifetime of the process. Use
/// [`LeasedCounter`] when codes must not repeat across restarts or nodes.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Starts counting from `offset`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            value: AtomicU64::new(offset),
        }
    }

    /// The value the next call will return.
    pub fn peek(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CounterSource for AtomicCounter {
    async fn next_value(&self) -> Result<u64> {
        Ok(self.value.fetch_add(1, Ordering::Relaxed))
    }
}

/// A counter that leases blocks of values from a durable [`SequenceStore`].
///
/// Every process sharing the store gets disjoint blocks, and a restarted
/// process leases a fresh block instead of replaying old values. Values left
/// in a block when the process stops are skipped, never reused.
#[derive(Debug)]
pub struct LeasedCounter<S> {
    store: Arc<S>,
    sequence: String,
    block_size: u64,
    offset: u64,
    block: Mutex<Range<u64>>,
}

impl<S: SequenceStore> LeasedCounter<S> {
    /// Leases `block_size` values at a time (at least one) from `sequence`.
    pub fn new(store: Arc<S>, sequence: impl Into<String>, block_size: u64) -> Self {
        Self {
            store,
            sequence: sequence.into(),
            block_size: block_size.max(1),
            offset: 0,
            block: Mutex::new(0..0),
        }
    }

    /// Shifts every issued value by `offset`.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }
}

#[async_trait]
impl<S: SequenceStore> CounterSource for LeasedCounter<S> {
    async fn next_value(&self) -> Result<u64> {
        let mut block = self.block.lock().await;
        if block.is_empty() {
            let start = self.store.reserve(&self.sequence, self.block_size).await?;
            debug!(sequence = %self.sequence, start, size = self.block_size, "leased counter block");
            *block = start..start.saturating_add(self.block_size);
        }
        // the block is non-empty here
        let value = block.start;
        block.start += 1;
        Ok(self.offset.wrapping_add(value))
    }
}
