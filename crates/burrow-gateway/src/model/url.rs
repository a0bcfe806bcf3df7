use std::time::Duration;

use burrow_core::{ExpirationPolicy, ShortCode, ShortenParams, ValidationError};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub url: String,
    pub custom_alias: Option<String>,
    /// RFC 3339 timestamp.
    pub expire_at: Option<String>,
    pub expires_in_secs: Option<u64>,
}

impl CreateUrlRequest {
    /// Turns the request into allocation parameters.
    ///
    /// A relative expiry is pinned to an absolute timestamp here so the
    /// response can echo exactly what was stored.
    pub fn into_params(self, now: Timestamp) -> Result<ShortenParams, ValidationError> {
        let expiration = match (self.expire_at, self.expires_in_secs) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::InvalidExpiration(
                    "expire_at and expires_in_secs are mutually exclusive".to_string(),
                ))
            }
            (Some(raw), None) => {
                let at: Timestamp = raw
                    .parse()
                    .map_err(|e| ValidationError::InvalidExpiration(format!("{raw}: {e}")))?;
                ExpirationPolicy::AtTimestamp(at)
            }
            (None, Some(secs)) => {
                let duration = SignedDuration::try_from(Duration::from_secs(secs))
                    .map_err(|e| ValidationError::InvalidExpiration(e.to_string()))?;
                let at = now
                    .checked_add(duration)
                    .map_err(|e| ValidationError::InvalidExpiration(e.to_string()))?;
                ExpirationPolicy::AtTimestamp(at)
            }
            (None, None) => ExpirationPolicy::Never,
        };

        let mut params = ShortenParams::new(self.url).with_expiration(expiration);
        if let Some(alias) = self.custom_alias {
            params = params.with_alias(ShortCode::new(alias)?);
        }
        Ok(params)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub destination: String,
    pub expire_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(expire_at: Option<&str>, expires_in_secs: Option<u64>) -> CreateUrlRequest {
        CreateUrlRequest {
            url: "https://example.com".to_string(),
            custom_alias: None,
            expire_at: expire_at.map(str::to_string),
            expires_in_secs,
        }
    }

    #[test]
    fn relative_expiry_is_pinned_to_now() {
        let now = Timestamp::from_second(1_700_000_000).unwrap();
        let params = request(None, Some(60)).into_params(now).unwrap();
        assert_eq!(
            params.expiration,
            ExpirationPolicy::AtTimestamp(Timestamp::from_second(1_700_000_060).unwrap())
        );
    }

    #[test]
    fn absolute_expiry_is_parsed() {
        let params = request(Some("2030-01-01T00:00:00Z"), None)
            .into_params(Timestamp::now())
            .unwrap();
        assert_eq!(
            params.expiration,
            ExpirationPolicy::AtTimestamp("2030-01-01T00:00:00Z".parse().unwrap())
        );
    }

    #[test]
    fn conflicting_or_malformed_expiry_is_rejected() {
        assert!(request(Some("2030-01-01T00:00:00Z"), Some(60))
            .into_params(Timestamp::now())
            .is_err());
        assert!(request(Some("next tuesday"), None)
            .into_params(Timestamp::now())
            .is_err());
    }

    #[test]
    fn malformed_alias_is_rejected() {
        let mut req = request(None, None);
        req.custom_alias = Some("no spaces!".to_string());
        assert!(matches!(
            req.into_params(Timestamp::now()),
            Err(ValidationError::InvalidAlias(_))
        ));
    }
}
