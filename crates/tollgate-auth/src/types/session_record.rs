//! Per-identity session record.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::refresh_token::{RefreshToken, constant_time_eq};

/// The refresh token on record, kept as a SHA-256 digest.
///
/// The plaintext value is handed to the client and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRefreshToken {
    /// SHA-256 hash of the token value (hex).
    pub token_hash: String,

    /// When this token stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl StoredRefreshToken {
    /// Creates a stored token from an existing digest.
    #[must_use]
    pub fn new(token_hash: impl Into<String>, expires_at: OffsetDateTime) -> Self {
        Self {
            token_hash: token_hash.into(),
            expires_at,
        }
    }

    /// Hashes a freshly issued token for storage.
    #[must_use]
    pub fn from_token(token: &RefreshToken) -> Self {
        Self::new(RefreshToken::hash_value(&token.value), token.expires_at)
    }

    /// Compares a presented value against the digest on record in constant
    /// time.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        let presented_hash = RefreshToken::hash_value(presented);
        constant_time_eq(self.token_hash.as_bytes(), presented_hash.as_bytes())
    }

    /// Returns `true` if the token is expired at `now`.
    ///
    /// A token is no longer accepted at the instant of its expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// The refresh state held for one identity.
///
/// At most one refresh token is on record per identity. Writing a new one
/// replaces the previous value, which is how rotation invalidates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Identity this record belongs to.
    pub identity_id: String,

    /// The refresh token currently on record (`None` before the first login
    /// and after logout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<StoredRefreshToken>,
}

impl SessionRecord {
    /// Creates a record with no refresh token on file.
    #[must_use]
    pub fn empty(identity_id: impl Into<String>) -> Self {
        Self {
            identity_id: identity_id.into(),
            refresh_token: None,
        }
    }
}
