use async_trait::async_trait;
use burrow_core::store::Result;
use burrow_core::{
    InsertOutcome, MappingStore, ReadMappingStore, SequenceStore, ShortCode, StorageError,
    UrlRecord,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use tracing::trace;

/// A stored row. Deleted rows stay behind as tombstones so their code is
/// never handed out again.
#[derive(Debug, Clone)]
struct Row {
    record: UrlRecord,
    deleted_at: Option<Timestamp>,
}

impl Row {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// In-memory implementation of the mapping store using DashMap.
///
/// DashMap shards its locks, so reads and writes on different codes proceed
/// in parallel. The conditional insert runs under the shard lock of its key
/// through the entry API, which makes it a single atomic step.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: DashMap<ShortCode, Row>,
    sequences: DashMap<String, u64>,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            sequences: DashMap::new(),
        }
    }

    /// Creates a new in-memory store with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: DashMap::with_capacity(capacity),
            sequences: DashMap::new(),
        }
    }

    /// Number of codes ever inserted, tombstones included.
    pub fn reserved_codes(&self) -> usize {
        self.rows.len()
    }
}

#[async_trait]
impl ReadMappingStore for InMemoryStore {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self
            .rows
            .get(code)
            .filter(|row| row.is_live())
            .map(|row| row.record.clone()))
    }
}

#[async_trait]
impl MappingStore for InMemoryStore {
    async fn try_insert(&self, record: UrlRecord) -> Result<InsertOutcome> {
        match self.rows.entry(record.code.clone()) {
            Entry::Occupied(_) => {
                trace!(code = %record.code, "code already reserved");
                Ok(InsertOutcome::AlreadyExists)
            }
            Entry::Vacant(slot) => {
                slot.insert(Row {
                    record,
                    deleted_at: None,
                });
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let Some(mut row) = self.rows.get_mut(code) else {
            return Ok(false);
        };
        if !row.is_live() {
            return Ok(false);
        }
        row.deleted_at = Some(Timestamp::now());
        Ok(true)
    }

    async fn sweep_expired(&self, now: Timestamp) -> Result<u64> {
        let mut swept = 0;
        for mut row in self.rows.iter_mut() {
            if row.is_live() && row.record.is_expired_at(now) {
                row.deleted_at = Some(now);
                swept += 1;
            }
        }
        Ok(swept)
    }
}

#[async_trait]
impl SequenceStore for InMemoryStore {
    async fn reserve(&self, sequence: &str, size: u64) -> Result<u64> {
        let mut next = self.sequences.entry(sequence.to_owned()).or_insert(0);
        let start = *next;
        *next = start.checked_add(size).ok_or_else(|| {
            StorageError::Operation(format!("sequence {sequence} is exhausted"))
        })?;
        Ok(start)
    }
}
