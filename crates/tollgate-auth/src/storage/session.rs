//! Session record storage trait.
//!
//! This module defines the storage interface used by login, refresh and
//! logout.
//!
//! # Security Considerations
//!
//! - Rotation must be an atomic compare-and-swap on the stored value
//! - Only the SHA-256 digest of a refresh token is persisted
//! - At most one refresh token is on record per identity
//! - Refresh token values must never be logged by implementations

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{Identity, RefreshToken, SessionRecord};

/// Storage trait for per-identity session records.
///
/// # Implementations
///
/// - [`InMemorySessionStore`](crate::storage::InMemorySessionStore) - process-local store
/// - `tollgate-auth-postgres` - PostgreSQL storage backend
#[async_trait]
pub trait SessionRecordStore: Send + Sync {
    /// Loads the session record for an identity.
    ///
    /// # Returns
    ///
    /// Returns `None` if the identity is unknown. A known identity without a
    /// refresh token yields a record whose `refresh_token` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, identity_id: &str) -> AuthResult<Option<SessionRecord>>;

    /// Unconditionally writes `token` as the refresh token on record.
    ///
    /// Used on login, where any previous token is replaced. Implementations
    /// store [`StoredRefreshToken::from_token`](crate::types::StoredRefreshToken::from_token).
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is unknown or the write fails.
    async fn update_refresh_token(&self, identity_id: &str, token: &RefreshToken)
    -> AuthResult<()>;

    /// Resolves an identity by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_identity_by_email(&self, email: &str) -> AuthResult<Option<Identity>>;

    /// Replaces the refresh token on record only if it still matches the
    /// plaintext `expected` value.
    ///
    /// # Returns
    ///
    /// Returns `true` if the replacement was written, `false` if the stored
    /// value had already changed or the identity is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn rotate_refresh_token(
        &self,
        identity_id: &str,
        expected: &str,
        replacement: &RefreshToken,
    ) -> AuthResult<bool>;

    /// Removes the refresh token on record. A no-op if none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn clear_refresh_token(&self, identity_id: &str) -> AuthResult<()>;
}
