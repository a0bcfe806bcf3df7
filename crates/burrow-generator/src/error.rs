use thiserror::Error;

/// Errors returned when constructing a generator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid code length {length}; expected {min}..={max}")]
    InvalidLength { length: usize, min: usize, max: usize },
    #[error("multiplier {0} must be coprime with 62")]
    InvalidMultiplier(u64),
}
