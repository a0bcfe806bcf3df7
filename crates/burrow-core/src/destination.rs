use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use url::Url;

/// Default upper bound on the byte length of a destination URL.
pub const DEFAULT_MAX_LENGTH: usize = 2048;

/// A validated absolute `http`/`https` URL that a short code redirects to.
///
/// The only ways to obtain one are [`Destination::parse`] and
/// [`Destination::parse_with_limit`], so untyped input is checked once at the
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    /// Parses a destination using [`DEFAULT_MAX_LENGTH`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::parse_with_limit(raw, DEFAULT_MAX_LENGTH)
    }

    /// Parses a destination, rejecting inputs longer than `max_len` bytes.
    ///
    /// Surrounding whitespace is ignored. The stored form is the normalized
    /// serialization of the parsed URL: embedded tabs and newlines are
    /// dropped and non-ASCII input is percent-encoded (hosts as punycode), so
    /// it is always a valid `Location` header value. The limit applies to
    /// both the input and the normalized form.
    pub fn parse_with_limit(raw: &str, max_len: usize) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDestination);
        }
        if trimmed.len() > max_len {
            return Err(ValidationError::DestinationTooLong {
                len: trimmed.len(),
                max: max_len,
            });
        }

        let url =
            Url::parse(trimmed).map_err(|e| ValidationError::MalformedDestination(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(ValidationError::MissingHost);
        }

        let normalized: String = url.into();
        if normalized.len() > max_len {
            return Err(ValidationError::DestinationTooLong {
                len: normalized.len(),
                max: max_len,
            });
        }

        Ok(Self(normalized))
    }

    /// Rebuilds a destination read back from trusted storage.
    pub fn from_trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // the length limit is an allocation policy; stored values may predate it
        let raw = String::deserialize(deserializer)?;
        Self::parse_with_limit(&raw, usize::MAX).map_err(serde::de::Error::custom)
    }
}
