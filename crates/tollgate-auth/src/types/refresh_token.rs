//! Refresh token domain type.
//!
//! # Security
//!
//! - Values come from the operating system CSPRNG
//! - Stores keep only the SHA-256 digest (see [`RefreshToken::hash_value`])
//! - `Debug` output never contains the value

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// Number of random bytes in a refresh token (512 bits).
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// An opaque refresh token and its expiry.
///
/// The value carries no structure; it is only meaningful when compared
/// against the value on record for an identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// The opaque token value (base64url, no padding).
    pub value: String,

    /// When this token stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl RefreshToken {
    /// Creates a refresh token from an existing value.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Generates a fresh token valid for `lifetime` from `issued_at`.
    #[must_use]
    pub fn generate(issued_at: OffsetDateTime, lifetime: Duration) -> Self {
        Self {
            value: Self::generate_value(),
            expires_at: issued_at.saturating_add(lifetime),
        }
    }

    /// Generates a cryptographically secure random token value.
    ///
    /// Returns [`REFRESH_TOKEN_BYTES`] random bytes encoded as base64url
    /// (86 characters).
    #[must_use]
    pub fn generate_value() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hash a token value using SHA-256, hex encoded.
    ///
    /// This is the form stores persist and compare against.
    #[must_use]
    pub fn hash_value(value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Compares two byte slices without short-circuiting on the first difference.
///
/// The length check leaks only the length, which is fixed for generated tokens.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
