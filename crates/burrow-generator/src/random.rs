use crate::error::GeneratorError;
use crate::Generator;
use async_trait::async_trait;
use burrow_core::store::Result as StoreResult;
use burrow_core::{base62, shortcode, ShortCode};
use rand::Rng;

/// Generator drawing every character uniformly from the base62 alphabet.
///
/// Uses the thread-local CSPRNG, so each attempt draws fresh entropy. With
/// length 7 the space holds about 3.5 * 10^12 codes; collisions are rare but
/// possible and are resolved by the allocator's retry loop.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(length: usize) -> Result<Self, GeneratorError> {
        if !(shortcode::MIN_LENGTH..=shortcode::MAX_LENGTH).contains(&length) {
            return Err(GeneratorError::InvalidLength {
                length,
                min: shortcode::MIN_LENGTH,
                max: shortcode::MAX_LENGTH,
            });
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

#[async_trait]
impl Generator for RandomGenerator {
    async fn generate(&self, _attempt: u32) -> StoreResult<ShortCode> {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| char::from(base62::ALPHABET[rng.random_range(0..base62::ALPHABET.len())]))
            .collect();
        Ok(ShortCode::new_unchecked(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn codes_have_configured_length_and_alphabet() {
        let generator = RandomGenerator::new(8).unwrap();
        for attempt in 0..100 {
            let code = generator.generate(attempt).await.unwrap();
            assert_eq!(code.as_str().len(), 8);
            assert!(code.as_str().chars().all(base62::is_base62));
        }
    }

    #[tokio::test]
    async fn produces_distinct_codes() {
        let generator = RandomGenerator::new(10).unwrap();
        let mut codes = HashSet::new();
        for _ in 0..1_000 {
            codes.insert(generator.generate(0).await.unwrap());
        }
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn rejects_invalid_lengths() {
        assert!(RandomGenerator::new(2).is_err());
        assert!(RandomGenerator::new(33).is_err());
        assert!(RandomGenerator::new(32).is_ok());
    }
}
