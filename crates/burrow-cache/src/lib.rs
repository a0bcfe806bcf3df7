//! Resolution cache implementations.

pub mod moka;
pub mod null;

pub use self::moka::{CacheConfig, MokaResolutionCache};
pub use burrow_core::{CacheError, CachedDestination, ResolutionCache};
pub use null::NullCache;
