use crate::counter::{AtomicCounter, CounterSource};
use crate::error::GeneratorError;
use crate::Generator;
use async_trait::async_trait;
use burrow_core::store::Result as StoreResult;
use burrow_core::{base62, shortcode, ShortCode};
use typed_builder::TypedBuilder;

/// Longest code whose space `62^len` still fits in a `u64`.
pub const MAX_SEQUENTIAL_LENGTH: usize = 10;

/// Scrambles counter values so consecutive codes do not look consecutive.
///
/// `n -> (n * multiplier + offset) mod 62^len` is a bijection on the code
/// space as long as the multiplier is coprime with 62, so distinct counter
/// values always yield distinct codes.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct Obfuscator {
    #[builder(default = 2_654_435_761)]
    multiplier: u64,
    #[builder(default = 0xDEAD_BEEF)]
    offset: u64,
}

impl Default for Obfuscator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Obfuscator {
    /// The identity mapping, handy when readable sequential codes are wanted.
    pub fn identity() -> Self {
        Self::builder().multiplier(1).offset(0).build()
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Maps `value` (already reduced into `[0, space)`) onto the code space.
    pub fn obfuscate(&self, value: u64, space: u64) -> u64 {
        let space = u128::from(space);
        let mixed = u128::from(value) * u128::from(self.multiplier) + u128::from(self.offset);
        // mixed % space < space <= u64::MAX
        (mixed % space) as u64
    }

    fn is_coprime_with_base(&self) -> bool {
        self.multiplier % 2 != 0 && self.multiplier % 31 != 0
    }
}

/// Counter-backed generator producing fixed-width base62 codes.
///
/// Every call consumes a fresh counter value, so retries within an allocation
/// never repeat a candidate. Codes only collide once the counter wraps past
/// `62^length` values or is reused, which the allocator reports as exhaustion.
/// Pair it with a [`LeasedCounter`](crate::LeasedCounter) so restarts do not
/// reuse values.
#[derive(Debug)]
pub struct SequentialGenerator<C = AtomicCounter> {
    counter: C,
    obfuscator: Obfuscator,
    length: usize,
    space: u64,
}

impl SequentialGenerator<AtomicCounter> {
    /// Creates a generator backed by an in-process counter starting at zero.
    pub fn new(length: usize) -> Result<Self, GeneratorError> {
        Self::with_counter(length, AtomicCounter::new(), Obfuscator::default())
    }
}

impl<C: CounterSource> SequentialGenerator<C> {
    pub fn with_counter(
        length: usize,
        counter: C,
        obfuscator: Obfuscator,
    ) -> Result<Self, GeneratorError> {
        let space = base62::space(length)
            .filter(|_| (shortcode::MIN_LENGTH..=MAX_SEQUENTIAL_LENGTH).contains(&length))
            .ok_or(GeneratorError::InvalidLength {
                length,
                min: shortcode::MIN_LENGTH,
                max: MAX_SEQUENTIAL_LENGTH,
            })?;

        if !obfuscator.is_coprime_with_base() {
            return Err(GeneratorError::InvalidMultiplier(obfuscator.multiplier));
        }

        Ok(Self {
            counter,
            obfuscator,
            length,
            space,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct codes this generator can produce.
    pub fn space(&self) -> u64 {
        self.space
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}

#[async_trait]
impl<C: CounterSource> Generator for SequentialGenerator<C> {
    async fn generate(&self, _attempt: u32) -> StoreResult<ShortCode> {
        let value = self.counter.next_value().await? % self.space;
        let scrambled = self.obfuscator.obfuscate(value, self.space);
        Ok(ShortCode::new_unchecked(base62::encode_fixed(
            scrambled,
            self.length,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{LeasedCounter, DEFAULT_SEQUENCE};
    use burrow_core::StorageError;
    use burrow_storage::InMemoryStore;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn identity_obfuscator_produces_sequential_codes() {
        let generator =
            SequentialGenerator::with_counter(4, AtomicCounter::new(), Obfuscator::identity())
                .unwrap();

        assert_eq!(generator.generate(0).await.unwrap().as_str(), "0000");
        assert_eq!(generator.generate(0).await.unwrap().as_str(), "0001");
        assert_eq!(generator.generate(0).await.unwrap().as_str(), "0002");
    }

    #[tokio::test]
    async fn counter_offset_is_respected() {
        let generator = SequentialGenerator::with_counter(
            4,
            AtomicCounter::with_offset(62),
            Obfuscator::identity(),
        )
        .unwrap();

        assert_eq!(generator.generate(0).await.unwrap().as_str(), "0010");
    }

    #[test]
    fn obfuscate_is_a_bijection_on_small_space() {
        let obfuscator = Obfuscator::default();
        let space = base62::space(3).unwrap();

        let images: HashSet<u64> = (0..space).map(|v| obfuscator.obfuscate(v, space)).collect();
        assert_eq!(images.len() as u64, space);
    }

    #[tokio::test]
    async fn retries_never_repeat_a_candidate() {
        let generator = SequentialGenerator::new(6).unwrap();
        let mut candidates = HashSet::new();
        for attempt in 0..5 {
            candidates.insert(generator.generate(attempt).await.unwrap());
        }
        assert_eq!(candidates.len(), 5);
    }

    #[tokio::test]
    async fn codes_have_configured_length_and_alphabet() {
        let generator = SequentialGenerator::new(7).unwrap();
        for _ in 0..100 {
            let code = generator.generate(0).await.unwrap();
            assert_eq!(code.as_str().len(), 7);
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn rejects_lengths_outside_u64_space() {
        assert!(matches!(
            SequentialGenerator::new(11).unwrap_err(),
            GeneratorError::InvalidLength { length: 11, .. }
        ));
        assert!(SequentialGenerator::new(2).is_err());
        assert!(SequentialGenerator::new(10).is_ok());
    }

    #[test]
    fn rejects_multiplier_sharing_a_factor_with_62() {
        let obfuscator = Obfuscator::builder().multiplier(62).build();
        assert_eq!(
            SequentialGenerator::with_counter(5, AtomicCounter::new(), obfuscator).unwrap_err(),
            GeneratorError::InvalidMultiplier(62)
        );
    }

    #[tokio::test]
    async fn wraps_after_the_space_is_exhausted() {
        let generator =
            SequentialGenerator::with_counter(3, AtomicCounter::new(), Obfuscator::default())
                .unwrap();
        let first = generator.generate(0).await.unwrap();

        let wrapped = SequentialGenerator::with_counter(
            3,
            AtomicCounter::with_offset(generator.space()),
            Obfuscator::default(),
        )
        .unwrap();
        assert_eq!(wrapped.generate(0).await.unwrap(), first);
    }

    #[tokio::test]
    async fn leased_counter_keeps_codes_unique_across_restarts() {
        let store = Arc::new(InMemoryStore::new());
        let start = || {
            SequentialGenerator::with_counter(
                6,
                LeasedCounter::new(Arc::clone(&store), DEFAULT_SEQUENCE, 16),
                Obfuscator::default(),
            )
            .unwrap()
        };

        let mut codes = HashSet::new();
        for _ in 0..3 {
            let generator = start();
            for _ in 0..10 {
                let code = generator.generate(0).await.unwrap();
                assert!(codes.insert(code.clone()), "replayed {code}");
            }
        }
    }

    struct BrokenCounter;

    #[async_trait]
    impl CounterSource for BrokenCounter {
        async fn next_value(&self) -> StoreResult<u64> {
            Err(StorageError::Unavailable("sequence store down".into()))
        }
    }

    #[tokio::test]
    async fn counter_failures_are_reported() {
        let generator =
            SequentialGenerator::with_counter(6, BrokenCounter, Obfuscator::default()).unwrap();

        let err = generator.generate(0).await.unwrap_err();
        assert!(err.is_transient());
    }
}
