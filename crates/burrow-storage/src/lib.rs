//! Mapping store backends.

pub mod memory;
pub mod mysql;

pub use burrow_core::store::{InsertOutcome, MappingStore, ReadMappingStore, SequenceStore};
pub use burrow_core::StorageError;
pub use memory::InMemoryStore;
pub use mysql::MySqlStore;
