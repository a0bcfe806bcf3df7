use crate::error::AllocationError;
use crate::record::ExpirationPolicy;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, AllocationError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, Default)]
pub struct ShortenParams {
    /// The destination URL, not yet validated.
    pub destination: String,
    pub expiration: ExpirationPolicy,
    /// Optional caller-chosen code, used instead of a generated one.
    pub custom_alias: Option<ShortCode>,
}

impl ShortenParams {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }

    pub fn with_alias(mut self, alias: ShortCode) -> Self {
        self.custom_alias = Some(alias);
        self
    }
}

/// The write path: reserves a unique short code for a destination.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns its short code.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode>;

    /// Shortens `destination` with a generated code and no expiry.
    async fn allocate(&self, destination: &str) -> Result<ShortCode> {
        self.shorten(ShortenParams::new(destination)).await
    }
}
