use rand::Rng;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Bounded exponential backoff for transient store failures.
///
/// Collisions are retried immediately by the allocator and never consume this
/// budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct RetryPolicy {
    /// Retries after the first failed call.
    #[builder(default = 3)]
    pub max_retries: u32,
    #[builder(default = Duration::from_millis(50))]
    pub base_delay: Duration,
    #[builder(default = Duration::from_secs(1))]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self::builder().max_retries(0).build()
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`
    /// capped at `max_delay`, plus up to 25% jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let capped = self.capped_delay(retry);
        let jitter_cap = capped / 4;
        if jitter_cap.is_zero() {
            return capped;
        }
        let jitter_nanos = u64::try_from(jitter_cap.as_nanos()).unwrap_or(u64::MAX);
        capped + Duration::from_nanos(rand::rng().random_range(0..=jitter_nanos))
    }

    fn capped_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn delay_grows_exponentially_until_cap() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(2_000))
            .build();

        assert_eq!(policy.capped_delay(1), Duration::from_millis(100));
        assert_eq!(policy.capped_delay(2), Duration::from_millis(200));
        assert_eq!(policy.capped_delay(3), Duration::from_millis(400));
        assert_eq!(policy.capped_delay(10), Duration::from_millis(2_000));
        assert_eq!(policy.capped_delay(100), Duration::from_millis(2_000));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_millis(100))
            .build();

        for _ in 0..100 {
            let delay = policy.delay_for(2);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(250));
        }
    }

    #[test]
    fn zero_base_delay_is_zero() {
        let policy = RetryPolicy::builder().base_delay(Duration::ZERO).build();
        assert_eq!(policy.delay_for(3), Duration::ZERO);
    }
}
