//! Access token encoding and verification.
//!
//! Access tokens are compact JWTs signed with HS256 over a shared secret.
//! Every decode verifies the signature, the header algorithm, the issuer and
//! the audience. Expiry is checked against the injected [`Clock`] and can be
//! skipped explicitly with [`ExpiryCheck::Skip`]; nothing else can.
//!
//! ## Example
//!
//! ```ignore
//! use tollgate_auth::token::jwt::{ClaimsCodec, ExpiryCheck};
//!
//! let codec = ClaimsCodec::from_config(&config, clock)?;
//! let token = codec.encode(&identity, issued_at, expires_at, &jti)?;
//!
//! // Ordinary authenticated request
//! let claims = codec.decode(&token, ExpiryCheck::Enforce)?;
//!
//! // Refresh path: the token is expected to be expired
//! let claims = codec.decode(&token, ExpiryCheck::Skip)?;
//! ```

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::clock::Clock;
use crate::config::{ConfigError, SessionConfig};
use crate::types::Identity;

/// The only algorithm accepted for access tokens.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while encoding or decoding access tokens.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The token is not a well-formed JWT or its claims cannot be parsed.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// The token signature does not verify with the configured secret.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The header names an algorithm other than HS256.
    #[error("Disallowed algorithm: {message}")]
    DisallowedAlgorithm {
        /// Description of the algorithm mismatch.
        message: String,
    },

    /// The `iss` claim does not match the configured issuer.
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// The `aud` claim does not match the configured audience.
    #[error("Invalid audience")]
    InvalidAudience,

    /// A required claim is missing.
    #[error("Missing required claim: {claim}")]
    MissingClaim {
        /// Name of the missing claim.
        claim: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,
}

impl JwtError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `DisallowedAlgorithm` error.
    #[must_use]
    pub fn disallowed_algorithm(message: impl Into<String>) -> Self {
        Self::DisallowedAlgorithm {
            message: message.into(),
        }
    }

    /// Creates a new `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim {
            claim: claim.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::disallowed_algorithm(err.to_string()),
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::MissingRequiredClaim(claim) => Self::missing_claim(claim.clone()),
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Whether [`ClaimsCodec::decode`] rejects expired tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCheck {
    /// Reject tokens whose `exp` is at or before now.
    Enforce,
    /// Accept expired tokens. All other checks still apply.
    Skip,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (identity id).
    pub sub: String,

    /// Subject email.
    pub email: String,

    /// JWT ID, unique per issuance.
    pub jti: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,
}

impl AccessTokenClaims {
    /// Returns `true` if the token is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.exp <= now.unix_timestamp()
    }

    /// Issued-at as a timestamp, if representable.
    #[must_use]
    pub fn issued_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.iat).ok()
    }

    /// Expiry as a timestamp, if representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.exp).ok()
    }
}

// ============================================================================
// Claims Codec
// ============================================================================

/// Encodes and verifies access tokens.
///
/// This type is thread-safe (`Send + Sync`) and is shared via `Arc`.
pub struct ClaimsCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    clock: Arc<dyn Clock>,
}

impl ClaimsCodec {
    /// Creates a codec over a raw HMAC secret.
    #[must_use]
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
            clock,
        }
    }

    /// Creates a codec from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &SessionConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.secret_bytes(),
            config.issuer.clone(),
            config.audience.clone(),
            clock,
        ))
    }

    /// Signs a claim set for `identity`.
    ///
    /// Timestamps are truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn encode(
        &self,
        identity: &Identity,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
        token_id: &str,
    ) -> Result<String, JwtError> {
        let claims = AccessTokenClaims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            jti: token_id.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding(e.to_string()))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Signature, algorithm, issuer and audience are always checked. Expiry
    /// is checked against the codec clock only for [`ExpiryCheck::Enforce`].
    ///
    /// # Errors
    ///
    /// Returns the specific [`JwtError`] for the first failed check.
    pub fn decode(&self, token: &str, expiry: ExpiryCheck) -> Result<AccessTokenClaims, JwtError> {
        let claims = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation())?
            .claims;

        if expiry == ExpiryCheck::Enforce && claims.is_expired_at(self.clock.now()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Returns the configured issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the configured audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    // Expiry is left to `decode` so it can follow the injected clock.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use time::Duration;
    use time::macros::datetime;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";
    const ISSUER: &str = "https://auth.example.com";
    const AUDIENCE: &str = "https://api.example.com";

    fn test_codec() -> (ClaimsCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(datetime!(2024-01-01 00:00 UTC)));
        let codec = ClaimsCodec::new(SECRET, ISSUER, AUDIENCE, clock.clone());
        (codec, clock)
    }

    fn identity() -> Identity {
        Identity::new("u1", "a@b.com", "Alice")
    }

    fn issue(codec: &ClaimsCodec, now: OffsetDateTime, lifetime: Duration) -> String {
        codec
            .encode(&identity(), now, now + lifetime, "jti-1")
            .unwrap()
    }

    /// Rebuilds a token with a modified segment.
    fn replace_segment(token: &str, index: usize, segment: &str) -> String {
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[index] = segment;
        parts.join(".")
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let (codec, clock) = test_codec();
        let now = clock.now();
        let token = issue(&codec, now, Duration::minutes(10));

        let claims = codec.decode(&token, ExpiryCheck::Enforce).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.jti, "jti-1");
        assert_eq!(claims.iat, now.unix_timestamp());
        assert_eq!(claims.exp, (now + Duration::minutes(10)).unix_timestamp());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, AUDIENCE);
    }

    #[test]
    fn test_header_uses_hs256() {
        let (codec, clock) = test_codec();
        let token = issue(&codec, clock.now(), Duration::minutes(10));

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_expired_token_rejected_only_when_enforced() {
        let (codec, clock) = test_codec();
        let token = issue(&codec, clock.now(), Duration::minutes(10));

        clock.advance(Duration::minutes(11));

        let result = codec.decode(&token, ExpiryCheck::Enforce);
        assert!(matches!(result.unwrap_err(), JwtError::Expired));

        let claims = codec.decode(&token, ExpiryCheck::Skip).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[test]
    fn test_expiry_boundary() {
        let (codec, clock) = test_codec();
        let token = issue(&codec, clock.now(), Duration::minutes(10));

        clock.advance(Duration::minutes(10) - Duration::seconds(1));
        assert!(codec.decode(&token, ExpiryCheck::Enforce).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(codec.decode(&token, ExpiryCheck::Enforce).is_err());
    }

    #[test]
    fn test_invalid_signature_rejected() {
        let (codec, clock) = test_codec();
        let other = ClaimsCodec::new(
            b"another-secret-another-secret-xx",
            ISSUER,
            AUDIENCE,
            clock.clone(),
        );
        let token = issue(&other, clock.now(), Duration::minutes(10));

        for check in [ExpiryCheck::Enforce, ExpiryCheck::Skip] {
            let err = codec.decode(&token, check).unwrap_err();
            assert!(matches!(err, JwtError::InvalidSignature));
        }
    }

    #[test]
    fn test_wrong_issuer_rejected_in_both_modes() {
        let (codec, clock) = test_codec();
        let other = ClaimsCodec::new(SECRET, "https://evil.example.com", AUDIENCE, clock.clone());
        let token = issue(&other, clock.now(), Duration::minutes(10));

        for check in [ExpiryCheck::Enforce, ExpiryCheck::Skip] {
            let err = codec.decode(&token, check).unwrap_err();
            assert!(matches!(err, JwtError::InvalidIssuer));
        }
    }

    #[test]
    fn test_wrong_audience_rejected_in_both_modes() {
        let (codec, clock) = test_codec();
        let other = ClaimsCodec::new(SECRET, ISSUER, "https://other.example.com", clock.clone());
        let token = issue(&other, clock.now(), Duration::minutes(10));

        for check in [ExpiryCheck::Enforce, ExpiryCheck::Skip] {
            let err = codec.decode(&token, check).unwrap_err();
            assert!(matches!(err, JwtError::InvalidAudience));
        }
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        let (codec, clock) = test_codec();
        let now = clock.now();
        let claims = AccessTokenClaims {
            sub: "u1".to_string(),
            email: "a@b.com".to_string(),
            jti: "jti-1".to_string(),
            iat: now.unix_timestamp(),
            exp: (now + Duration::minutes(10)).unix_timestamp(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
        };

        // Same secret, different HMAC algorithm
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        for check in [ExpiryCheck::Enforce, ExpiryCheck::Skip] {
            let err = codec.decode(&token, check).unwrap_err();
            assert!(matches!(err, JwtError::DisallowedAlgorithm { .. }));
        }
    }

    #[test]
    fn test_alg_none_rejected() {
        let (codec, clock) = test_codec();
        let token = issue(&codec, clock.now(), Duration::minutes(10));

        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let unsigned = replace_segment(&replace_segment(&token, 0, &none_header), 2, "");

        for check in [ExpiryCheck::Enforce, ExpiryCheck::Skip] {
            assert!(codec.decode(&unsigned, check).is_err());
        }
    }

    #[test]
    fn test_flipped_bytes_rejected() {
        let (codec, clock) = test_codec();
        let token = issue(&codec, clock.now(), Duration::minutes(10));
        let bytes = token.as_bytes();

        for position in 0..bytes.len() {
            if bytes[position] == b'.' {
                continue;
            }
            let mut tampered = bytes.to_vec();
            // Stay inside the base64url alphabet
            tampered[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();

            for check in [ExpiryCheck::Enforce, ExpiryCheck::Skip] {
                assert!(
                    codec.decode(&tampered, check).is_err(),
                    "tampered byte {} accepted",
                    position
                );
            }
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (codec, clock) = test_codec();
        let token = issue(&codec, clock.now(), Duration::minutes(10));

        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": "admin",
                "email": "admin@b.com",
                "jti": "jti-1",
                "iat": 0,
                "exp": i64::MAX,
                "iss": ISSUER,
                "aud": AUDIENCE,
            })
            .to_string(),
        );
        let forged = replace_segment(&token, 1, &forged_payload);

        let err = codec.decode(&forged, ExpiryCheck::Skip).unwrap_err();
        assert!(matches!(err, JwtError::InvalidSignature));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let (codec, _) = test_codec();

        for garbage in ["", "not-a-jwt", "a.b", "a.b.c", "...."] {
            let err = codec.decode(garbage, ExpiryCheck::Skip).unwrap_err();
            assert!(!matches!(err, JwtError::Expired), "{garbage:?} gave {err}");
        }
    }

    #[test]
    fn test_from_config_validates() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(datetime!(2024-01-01 00:00 UTC)));
        let bad = SessionConfig::new("short", ISSUER, AUDIENCE);
        assert!(ClaimsCodec::from_config(&bad, clock.clone()).is_err());

        let good = SessionConfig::new(std::str::from_utf8(SECRET).unwrap(), ISSUER, AUDIENCE);
        let codec = ClaimsCodec::from_config(&good, clock).unwrap();
        assert_eq!(codec.issuer(), ISSUER);
        assert_eq!(codec.audience(), AUDIENCE);
    }
}
