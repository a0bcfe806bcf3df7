use thiserror::Error;

/// Errors related to the core value types.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// A user-correctable problem with the input of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination url cannot be empty")]
    EmptyDestination,
    #[error("destination url is {len} bytes, the limit is {max}")]
    DestinationTooLong { len: usize, max: usize },
    #[error("destination url is malformed: {0}")]
    MalformedDestination(String),
    #[error("destination url scheme must be http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("destination url must have a host")]
    MissingHost,
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error(transparent)]
    InvalidAlias(#[from] CoreError),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::Timeout(_))
    }
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Failure to reserve a short code for a destination.
#[derive(Debug, Clone, Error)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("alias already exists: {0}")]
    AliasConflict(String),
    /// Every candidate collided. Frequent occurrences mean the code length or
    /// generator needs review.
    #[error("no unique short code found after {attempts} attempts")]
    CollisionRetryExhausted { attempts: u32 },
    #[error("storage unavailable after {retries} retries: {source}")]
    TransientStoreFailure {
        retries: u32,
        #[source]
        source: StorageError,
    },
    #[error("storage error: {0}")]
    Storage(StorageError),
}

/// Failure to answer a lookup. An unknown or expired code is not an error.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    #[error("storage unavailable after {retries} retries: {source}")]
    TransientStoreFailure {
        retries: u32,
        #[source]
        source: StorageError,
    },
    #[error("storage error: {0}")]
    Storage(StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_storage_errors() {
        assert!(StorageError::Timeout("t".into()).is_transient());
        assert!(StorageError::Unavailable("u".into()).is_transient());
        assert!(!StorageError::Query("q".into()).is_transient());
        assert!(!StorageError::InvalidData("d".into()).is_transient());
    }

    #[test]
    fn alias_error_converts_into_validation() {
        let err: ValidationError = CoreError::InvalidShortCode("x".into()).into();
        assert!(matches!(err, ValidationError::InvalidAlias(_)));
    }
}
