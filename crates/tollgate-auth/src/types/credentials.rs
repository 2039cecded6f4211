//! Credential pair returned to authentication flows.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::refresh_token::RefreshToken;

/// A freshly issued access/refresh token pair.
///
/// Returned by login and refresh. Serialized in camelCase:
///
/// ```json
/// {
///   "accessToken": "eyJ...",
///   "accessTokenExpiry": "2024-01-01T00:10:00Z",
///   "refreshToken": "q3Jd...",
///   "refreshTokenExpiry": "2024-01-08T00:00:00Z",
///   "email": "a@b.com",
///   "name": "Alice"
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// Signed access token (JWT).
    pub access_token: String,

    /// When the access token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub access_token_expiry: OffsetDateTime,

    /// Opaque refresh token.
    pub refresh_token: String,

    /// When the refresh token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_token_expiry: OffsetDateTime,

    /// Email of the identity the pair was issued to.
    pub email: String,

    /// Display name of the identity the pair was issued to.
    pub name: String,
}

impl CredentialPair {
    /// Returns the refresh half of the pair as it should be recorded.
    #[must_use]
    pub fn refresh_record(&self) -> RefreshToken {
        RefreshToken::new(self.refresh_token.clone(), self.refresh_token_expiry)
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token", &"<redacted>")
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish()
    }
}
