//! URL allocation service.
//!
//! [`AllocationService`] validates a destination, draws candidate codes from a
//! [`Generator`](burrow_generator::Generator) and reserves the first one the
//! mapping store accepts. Core types are re-exported from `burrow_core`.

pub mod service;

pub use burrow_core::{AllocationError, ShortenParams, Shortener};
pub use service::AllocationService;
