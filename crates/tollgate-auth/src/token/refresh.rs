//! Refresh token rotation.
//!
//! A refresh exchanges an expired (or still valid) access token plus the
//! refresh token on record for a brand new pair. The presented refresh token
//! stops working the moment the exchange succeeds.
//!
//! # Flow
//!
//! 1. Decode the access token with expiry skipped. Signature, algorithm,
//!    issuer and audience are still verified.
//! 2. Resolve the identity by the `email` claim and check it owns `sub`.
//! 3. Load the session record and compare the presented refresh token
//!    against the one on record, then check its expiry.
//! 4. Mint a new pair and swap it in with a compare-and-swap on the old
//!    value. Losing the swap means another refresh got there first.
//!
//! Every failure is reported to the caller as [`AuthError::RefreshDenied`].

use std::sync::Arc;

use crate::AuthResult;
use crate::clock::Clock;
use crate::error::{AuthError, DenyReason};
use crate::storage::SessionRecordStore;
use crate::token::issuer::AccessTokenIssuer;
use crate::token::jwt::{ClaimsCodec, ExpiryCheck};
use crate::types::CredentialPair;

/// Validates refresh requests and rotates refresh tokens.
pub struct RefreshCoordinator {
    codec: Arc<ClaimsCodec>,
    issuer: Arc<AccessTokenIssuer>,
    store: Arc<dyn SessionRecordStore>,
    clock: Arc<dyn Clock>,
}

impl RefreshCoordinator {
    /// Creates a new refresh coordinator.
    #[must_use]
    pub fn new(
        codec: Arc<ClaimsCodec>,
        issuer: Arc<AccessTokenIssuer>,
        store: Arc<dyn SessionRecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            issuer,
            store,
            clock,
        }
    }

    /// Exchanges an access/refresh token pair for a new pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshDenied` for any failure, including store
    /// failures. The reason is logged, never returned.
    ///
    /// # Security
    ///
    /// - Token values are never logged
    /// - Concurrent refreshes with the same token yield at most one success
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> AuthResult<CredentialPair> {
        self.try_refresh(access_token, refresh_token)
            .await
            .map_err(|reason| {
                match &reason {
                    DenyReason::RotationConflict | DenyReason::Store(_) | DenyReason::Issuance(_) => {
                        tracing::warn!(reason = reason.as_str(), error = %reason, "Refresh denied");
                    }
                    _ => {
                        tracing::debug!(reason = reason.as_str(), error = %reason, "Refresh denied");
                    }
                }
                AuthError::RefreshDenied
            })
    }

    async fn try_refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<CredentialPair, DenyReason> {
        // 1. Verify everything except expiry
        let claims = self
            .codec
            .decode(access_token, ExpiryCheck::Skip)
            .map_err(DenyReason::InvalidAccessToken)?;

        // 2. Resolve identity and bind it to the subject
        let identity = self
            .store
            .find_identity_by_email(&claims.email)
            .await
            .map_err(DenyReason::Store)?
            .ok_or(DenyReason::UnknownIdentity)?;

        if identity.id != claims.sub {
            return Err(DenyReason::SubjectMismatch);
        }

        // 3. Compare against the token on record
        let record = self
            .store
            .find(&identity.id)
            .await
            .map_err(DenyReason::Store)?
            .ok_or(DenyReason::NoSession)?;

        let stored = record.refresh_token.ok_or(DenyReason::NoSession)?;

        if !stored.matches(refresh_token) {
            return Err(DenyReason::RefreshTokenMismatch);
        }

        if stored.is_expired_at(self.clock.now()) {
            return Err(DenyReason::RefreshTokenExpired);
        }

        // 4. Mint and swap
        let pair = self
            .issuer
            .issue_for_identity(&identity)
            .map_err(DenyReason::Issuance)?;

        let rotated = self
            .store
            .rotate_refresh_token(&identity.id, refresh_token, &pair.refresh_record())
            .await
            .map_err(DenyReason::Store)?;

        if !rotated {
            return Err(DenyReason::RotationConflict);
        }

        tracing::info!(identity_id = %identity.id, "Refresh token rotated");
        Ok(pair)
    }
}
