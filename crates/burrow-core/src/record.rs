use crate::destination::Destination;
use crate::error::ValidationError;
use crate::shortcode::ShortCode;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored code to URL mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub code: ShortCode,
    pub destination: Destination,
    pub created_at: Timestamp,
    /// When the record stops resolving, if ever.
    pub expires_at: Option<Timestamp>,
}

impl UrlRecord {
    pub fn new(
        code: ShortCode,
        destination: Destination,
        created_at: Timestamp,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            code,
            destination,
            created_at,
            expires_at,
        }
    }

    /// Whether the record has expired as of `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// The shortened URL never expires.
    #[default]
    Never,
    /// The shortened URL expires after a certain duration from now.
    AfterDuration(Duration),
    /// The shortened URL expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

impl ExpirationPolicy {
    /// Converts the policy into an absolute expiry relative to `now`.
    ///
    /// Expiries that are not strictly in the future are rejected.
    pub fn expires_at(&self, now: Timestamp) -> Result<Option<Timestamp>, ValidationError> {
        let expires_at = match self {
            ExpirationPolicy::Never => return Ok(None),
            ExpirationPolicy::AfterDuration(duration) => {
                let duration = SignedDuration::try_from(*duration)
                    .map_err(|e| ValidationError::InvalidExpiration(e.to_string()))?;
                now.checked_add(duration)
                    .map_err(|e| ValidationError::InvalidExpiration(e.to_string()))?
            }
            ExpirationPolicy::AtTimestamp(timestamp) => *timestamp,
        };

        if expires_at <= now {
            return Err(ValidationError::InvalidExpiration(format!(
                "{expires_at} is not in the future"
            )));
        }

        Ok(Some(expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_at: Option<Timestamp>) -> UrlRecord {
        UrlRecord::new(
            ShortCode::new_unchecked("abc123"),
            Destination::from_trusted("https://example.com"),
            Timestamp::from_second(1_000).unwrap(),
            expires_at,
        )
    }

    #[test]
    fn record_without_expiry_never_expires() {
        assert!(!record(None).is_expired_at(Timestamp::MAX));
    }

    #[test]
    fn record_expires_at_boundary() {
        let at = Timestamp::from_second(2_000).unwrap();
        let rec = record(Some(at));
        assert!(!rec.is_expired_at(Timestamp::from_second(1_999).unwrap()));
        assert!(rec.is_expired_at(at));
    }

    #[test]
    fn policy_never() {
        let now = Timestamp::now();
        assert_eq!(ExpirationPolicy::Never.expires_at(now).unwrap(), None);
    }

    #[test]
    fn policy_after_duration() {
        let now = Timestamp::from_second(1_000).unwrap();
        let got = ExpirationPolicy::AfterDuration(Duration::from_secs(60))
            .expires_at(now)
            .unwrap();
        assert_eq!(got, Some(Timestamp::from_second(1_060).unwrap()));
    }

    #[test]
    fn policy_rejects_past_and_zero() {
        let now = Timestamp::from_second(1_000).unwrap();
        assert!(ExpirationPolicy::AtTimestamp(Timestamp::from_second(999).unwrap())
            .expires_at(now)
            .is_err());
        assert!(ExpirationPolicy::AfterDuration(Duration::ZERO)
            .expires_at(now)
            .is_err());
    }
}
