//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the value types, store and cache contracts, error
//! taxonomy and configuration shared by the allocation (shortener) and
//! resolution (redirector) services.

pub mod base62;
pub mod cache;
pub mod config;
pub mod destination;
pub mod error;
pub mod record;
pub mod redirector;
pub mod retry;
pub mod shortcode;
pub mod shortener;
pub mod store;

pub use cache::{CachedDestination, ResolutionCache};
pub use config::EngineConfig;
pub use destination::Destination;
pub use error::{
    AllocationError, CacheError, CoreError, ResolutionError, StorageError, ValidationError,
};
pub use record::{ExpirationPolicy, UrlRecord};
pub use redirector::Redirector;
pub use retry::RetryPolicy;
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};
pub use store::{InsertOutcome, MappingStore, ReadMappingStore, SequenceStore};
