//! Resource versions and ETag handling.
//!
//! A [`Version`] is an opaque token computed from a hash of the stored record.
//! On the wire it travels as a weak entity tag (`W/"<token>"`) in `meta.version`
//! and the `ETag` header; clients send it back in `If-Match` to make a
//! mutation conditional.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque resource version token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Derive a version from content bytes: the first 8 bytes of a SHA-256
    /// digest, base64 encoded.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        Self(BASE64.encode(&hash[..8]))
    }

    /// Wrap a token produced elsewhere (e.g. a host store's own revision id).
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Weak entity tag, `W/"<token>"`.
    pub fn to_etag(&self) -> String {
        format!("W/\"{}\"", self.0)
    }

    /// Parse an entity tag, weak or strong.
    pub fn parse_etag(etag: &str) -> Result<Self, VersionError> {
        let trimmed = etag.trim();
        let quoted = trimmed
            .strip_prefix("W/")
            .or_else(|| trimmed.strip_prefix("w/"))
            .unwrap_or(trimmed);

        let token = quoted
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| VersionError::InvalidEtagFormat(etag.to_string()))?;

        if token.is_empty() {
            return Err(VersionError::InvalidEtagFormat(etag.to_string()));
        }
        Ok(Self(token.to_string()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed `If-Match` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfMatch {
    /// `*`: any current version
    Any,
    /// One or more entity tags, compared weakly
    Tags(Vec<Version>),
}

impl IfMatch {
    /// Weak comparison against the current version (RFC 9110 §13.1.1).
    pub fn matches(&self, current: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|tag| tag == current),
        }
    }
}

impl FromStr for IfMatch {
    type Err = VersionError;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let trimmed = header.trim();
        if trimmed == "*" {
            return Ok(Self::Any);
        }

        let tags = trimmed
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(Version::parse_etag)
            .collect::<Result<Vec<_>, _>>()?;

        if tags.is_empty() {
            return Err(VersionError::InvalidEtagFormat(header.to_string()));
        }
        Ok(Self::Tags(tags))
    }
}

/// Errors raised while parsing versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid ETag format: {0}")]
    InvalidEtagFormat(String),
}
