//! Credential pair issuance.
//!
//! The issuer mints a signed access token and a random refresh token for an
//! identity. It never touches storage; persisting the refresh half is the
//! caller's job.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::clock::Clock;
use crate::config::{ConfigError, SessionConfig};
use crate::error::AuthError;
use crate::token::jwt::ClaimsCodec;
use crate::types::{CredentialPair, Identity, RefreshToken};

/// Mints access/refresh credential pairs.
pub struct AccessTokenIssuer {
    codec: Arc<ClaimsCodec>,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl AccessTokenIssuer {
    /// Creates a new issuer.
    ///
    /// # Arguments
    ///
    /// * `codec` - Codec used to sign access tokens
    /// * `access_lifetime` - Lifetime of issued access tokens
    /// * `refresh_lifetime` - Lifetime of issued refresh tokens
    /// * `clock` - Time source for `iat`/`exp`
    #[must_use]
    pub fn new(
        codec: Arc<ClaimsCodec>,
        access_lifetime: Duration,
        refresh_lifetime: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            access_lifetime,
            refresh_lifetime,
            clock,
        }
    }

    /// Creates an issuer using the lifetimes from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(
        config: &SessionConfig,
        codec: Arc<ClaimsCodec>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            codec,
            config.access_lifetime(),
            config.refresh_lifetime(),
            clock,
        ))
    }

    /// Issues a fresh credential pair for `identity`.
    ///
    /// The access token expires `access_lifetime` after now and the refresh
    /// token `refresh_lifetime` after now. Each call yields a new `jti` and a
    /// new refresh value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if signing fails.
    pub fn issue_for_identity(&self, identity: &Identity) -> AuthResult<CredentialPair> {
        let now = self.now_seconds();
        let access_expiry = now.saturating_add(self.access_lifetime);
        let token_id = Uuid::new_v4().to_string();

        let access_token = self
            .codec
            .encode(identity, now, access_expiry, &token_id)
            .map_err(|e| AuthError::internal(format!("Failed to encode access token: {}", e)))?;

        let refresh = RefreshToken::generate(now, self.refresh_lifetime);

        Ok(CredentialPair {
            access_token,
            access_token_expiry: access_expiry,
            refresh_token: refresh.value,
            refresh_token_expiry: refresh.expires_at,
            email: identity.email.clone(),
            name: identity.name.clone(),
        })
    }

    /// Access token lifetime.
    #[must_use]
    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    /// Refresh token lifetime.
    #[must_use]
    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    // Whole seconds, so the reported expiry equals the `exp` claim.
    fn now_seconds(&self) -> OffsetDateTime {
        let now = self.clock.now();
        OffsetDateTime::from_unix_timestamp(now.unix_timestamp()).unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::token::jwt::ExpiryCheck;
    use time::macros::datetime;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn setup() -> (AccessTokenIssuer, Arc<ClaimsCodec>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(datetime!(2024-01-01 00:00 UTC)));
        let config = SessionConfig::new(SECRET, "issuer", "audience");
        let codec = Arc::new(ClaimsCodec::from_config(&config, clock.clone()).unwrap());
        let issuer = AccessTokenIssuer::from_config(&config, codec.clone(), clock.clone()).unwrap();
        (issuer, codec, clock)
    }

    #[test]
    fn test_issue_sets_expiries() {
        let (issuer, _, clock) = setup();
        let t0 = clock.now();

        let pair = issuer
            .issue_for_identity(&Identity::new("u1", "a@b.com", "Alice"))
            .unwrap();

        assert_eq!(pair.access_token_expiry, t0 + Duration::seconds(600));
        assert_eq!(pair.refresh_token_expiry, t0 + Duration::seconds(604_800));
        assert_eq!(pair.email, "a@b.com");
        assert_eq!(pair.name, "Alice");
        assert_eq!(pair.refresh_token.len(), 86);
    }

    #[test]
    fn test_issued_access_token_decodes() {
        let (issuer, codec, clock) = setup();
        let pair = issuer
            .issue_for_identity(&Identity::new("u1", "a@b.com", "Alice"))
            .unwrap();

        let claims = codec.decode(&pair.access_token, ExpiryCheck::Enforce).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.iat, clock.now().unix_timestamp());
        assert_eq!(claims.exp, pair.access_token_expiry.unix_timestamp());
    }

    #[test]
    fn test_subsecond_clock_truncated() {
        let (issuer, _, clock) = setup();
        clock.set(datetime!(2024-01-01 00:00:00.750 UTC));

        let pair = issuer
            .issue_for_identity(&Identity::new("u1", "a@b.com", "Alice"))
            .unwrap();
        assert_eq!(pair.access_token_expiry, datetime!(2024-01-01 00:10 UTC));
    }

    #[test]
    fn test_each_issue_is_unique() {
        let (issuer, codec, _) = setup();
        let identity = Identity::new("u1", "a@b.com", "Alice");

        let first = issuer.issue_for_identity(&identity).unwrap();
        let second = issuer.issue_for_identity(&identity).unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);

        let jti_a = codec.decode(&first.access_token, ExpiryCheck::Skip).unwrap().jti;
        let jti_b = codec.decode(&second.access_token, ExpiryCheck::Skip).unwrap().jti;
        assert_ne!(jti_a, jti_b);
    }
}
