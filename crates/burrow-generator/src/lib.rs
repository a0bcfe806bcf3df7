//! Short code generators.
//!
//! Generators never read or write mappings. Uniqueness is settled by the
//! mapping store's conditional insert, and the allocator asks for a new
//! candidate whenever one collides. Counter sources may reach the store to
//! lease blocks of values, hence the async, fallible interface.

pub mod counter;
pub mod error;
pub mod random;
pub mod sequential;

pub use counter::{AtomicCounter, CounterSource, LeasedCounter, DEFAULT_SEQUENCE};
pub use error::GeneratorError;
pub use random::RandomGenerator;
pub use sequential::{Obfuscator, SequentialGenerator};

use async_trait::async_trait;
use burrow_core::store::Result;
use burrow_core::ShortCode;
use std::sync::Arc;

/// Trait for generating candidate short codes.
///
/// `attempt` is the zero-based retry index within a single allocation. For
/// `attempt > 0` an implementation must return a candidate different from
/// the ones it returned for the earlier attempts of that allocation.
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    async fn generate(&self, attempt: u32) -> Result<ShortCode>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, attempt: u32) -> Result<ShortCode> {
        (**self).generate(attempt).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    async fn generate(&self, attempt: u32) -> Result<ShortCode> {
        (**self).generate(attempt).await
    }
}
