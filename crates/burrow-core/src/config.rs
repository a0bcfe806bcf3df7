use crate::destination;
use crate::retry::RetryPolicy;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Engine settings, built once at start-up and handed to the services.
#[derive(Debug, Clone, TypedBuilder)]
pub struct EngineConfig {
    /// Length of generated short codes.
    #[builder(default = 7)]
    pub code_length: usize,
    /// Candidate codes tried per allocation before giving up.
    #[builder(default = 5)]
    pub max_allocation_attempts: u32,
    /// Deadline applied to every individual store call.
    #[builder(default = Duration::from_secs(2))]
    pub store_timeout: Duration,
    /// Backoff for store calls that fail transiently.
    #[builder(default)]
    pub transient_retry: RetryPolicy,
    /// Maximum resident cache entries. Zero disables caching.
    #[builder(default = 10_000)]
    pub cache_max_entries: u64,
    /// Time after insertion at which a cache entry is treated as a miss.
    #[builder(default = Duration::from_secs(300))]
    pub cache_ttl: Duration,
    #[builder(default = destination::DEFAULT_MAX_LENGTH)]
    pub max_destination_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.code_length, 7);
        assert_eq!(config.max_allocation_attempts, 5);
        assert_eq!(config.store_timeout, Duration::from_secs(2));
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.max_destination_length, 2048);
    }

    #[test]
    fn builder_overrides() {
        let config = EngineConfig::builder()
            .code_length(4)
            .max_allocation_attempts(2)
            .transient_retry(RetryPolicy::none())
            .build();
        assert_eq!(config.code_length, 4);
        assert_eq!(config.max_allocation_attempts, 2);
        assert_eq!(config.transient_retry.max_retries, 0);
    }
}
