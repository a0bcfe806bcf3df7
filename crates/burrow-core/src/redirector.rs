use crate::destination::Destination;
use crate::error::ResolutionError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// The read path: answers short code lookups.
#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to its destination.
    /// Returns `None` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<Destination>, ResolutionError>;
}
