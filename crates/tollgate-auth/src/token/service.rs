//! Session service facade.
//!
//! Wires the codec, issuer, refresh coordinator and session store together
//! and exposes the four session operations:
//!
//! - `login` - issue a pair for an authenticated identity and record it
//! - `refresh` - rotate a pair
//! - `authenticate` - verify an access token for an ordinary request
//! - `logout` - drop the refresh token on record
//!
//! # Usage
//!
//! ```ignore
//! use tollgate_auth::{SessionConfig, SessionService, InMemorySessionStore};
//!
//! let config = SessionConfig::load(Some(Path::new("tollgate.toml")))?;
//! let service = SessionService::new(&config, Arc::new(InMemorySessionStore::new()))?;
//!
//! let pair = service.login(&identity).await?;
//! let claims = service.authenticate(&pair.access_token)?;
//! let rotated = service.refresh(&pair.access_token, &pair.refresh_token).await?;
//! ```

use std::sync::Arc;

use crate::AuthResult;
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::storage::SessionRecordStore;
use crate::token::issuer::AccessTokenIssuer;
use crate::token::jwt::{AccessTokenClaims, ClaimsCodec, ExpiryCheck, JwtError};
use crate::token::refresh::RefreshCoordinator;
use crate::types::{CredentialPair, Identity};

/// Entry point for session operations.
pub struct SessionService {
    codec: Arc<ClaimsCodec>,
    issuer: Arc<AccessTokenIssuer>,
    coordinator: RefreshCoordinator,
    store: Arc<dyn SessionRecordStore>,
}

impl SessionService {
    /// Creates a service on the system clock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `config` does not validate.
    pub fn new(config: &SessionConfig, store: Arc<dyn SessionRecordStore>) -> AuthResult<Self> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Creates a service on an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `config` does not validate.
    pub fn with_clock(
        config: &SessionConfig,
        store: Arc<dyn SessionRecordStore>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        let codec = Arc::new(ClaimsCodec::from_config(config, clock.clone())?);
        let issuer = Arc::new(AccessTokenIssuer::from_config(
            config,
            codec.clone(),
            clock.clone(),
        )?);
        let coordinator =
            RefreshCoordinator::new(codec.clone(), issuer.clone(), store.clone(), clock);

        Ok(Self {
            codec,
            issuer,
            coordinator,
            store,
        })
    }

    /// Issues and records a credential pair for an authenticated identity.
    ///
    /// Any refresh token previously on record is replaced.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the pair cannot be recorded. No
    /// credentials are returned in that case.
    pub async fn login(&self, identity: &Identity) -> AuthResult<CredentialPair> {
        let pair = self.issuer.issue_for_identity(identity)?;

        self.store
            .update_refresh_token(&identity.id, &pair.refresh_record())
            .await
            .map_err(|e| match e {
                AuthError::Storage { .. } => e,
                other => AuthError::storage(other.to_string()),
            })?;

        tracing::info!(identity_id = %identity.id, "Session started");
        Ok(pair)
    }

    /// Rotates a credential pair. See [`RefreshCoordinator::refresh`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshDenied` on any failure.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> AuthResult<CredentialPair> {
        self.coordinator.refresh(access_token, refresh_token).await
    }

    /// Verifies an access token for an ordinary authenticated request.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for every other failure.
    pub fn authenticate(&self, access_token: &str) -> AuthResult<AccessTokenClaims> {
        self.codec
            .decode(access_token, ExpiryCheck::Enforce)
            .map_err(|e| match e {
                JwtError::Expired => AuthError::TokenExpired,
                other => {
                    tracing::debug!(error = %other, "Access token rejected");
                    AuthError::invalid_token(other.to_string())
                }
            })
    }

    /// Drops the refresh token on record for `identity_id`.
    ///
    /// Access tokens already issued stay valid until they expire.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store fails.
    pub async fn logout(&self, identity_id: &str) -> AuthResult<()> {
        self.store.clear_refresh_token(identity_id).await?;
        tracing::info!(identity_id = %identity_id, "Session ended");
        Ok(())
    }

    /// Returns the claims codec.
    #[must_use]
    pub fn codec(&self) -> &ClaimsCodec {
        &self.codec
    }

    /// Returns the credential issuer.
    #[must_use]
    pub fn issuer(&self) -> &AccessTokenIssuer {
        &self.issuer
    }
}
