//! Resolution service with read-through caching.
//!
//! [`ResolutionService`] answers short code lookups from a bounded cache,
//! falling back to the mapping store on a miss.
//!
//! ```rust
//! use burrow_cache::MokaResolutionCache;
//! use burrow_core::{EngineConfig, ShortCode};
//! use burrow_redirector::ResolutionService;
//! use burrow_storage::InMemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ResolutionService::new(
//!     InMemoryStore::new(),
//!     MokaResolutionCache::default(),
//!     EngineConfig::default(),
//! );
//!
//! let code = ShortCode::new("abc123")?;
//! if let Some(destination) = service.resolve(&code).await? {
//!     println!("Redirect to: {destination}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod service;

pub use burrow_core::{Redirector, ResolutionError};
pub use service::ResolutionService;
