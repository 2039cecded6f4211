//! Arc-owning session store adapter.
//!
//! Wraps the lifetime-based [`SessionStorage`] and owns an `Arc<PgPool>`,
//! so it can be handed to the session service as
//! `Arc<dyn SessionRecordStore>`.

use std::sync::Arc;

use async_trait::async_trait;

use tollgate_auth::storage::SessionRecordStore;
use tollgate_auth::types::{Identity, RefreshToken, SessionRecord};
use tollgate_auth::{AuthError, AuthResult};

use crate::session::SessionStorage;
use crate::{PgPool, StorageError};

/// PostgreSQL [`SessionRecordStore`].
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: Arc<PgPool>,
}

impl PostgresSessionStore {
    /// Create a new store over a shared pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn storage(&self) -> SessionStorage<'_> {
        SessionStorage::new(&self.pool)
    }
}

fn to_auth_error(err: StorageError) -> AuthError {
    AuthError::storage(err.to_string())
}

#[async_trait]
impl SessionRecordStore for PostgresSessionStore {
    async fn find(&self, identity_id: &str) -> AuthResult<Option<SessionRecord>> {
        let row = self
            .storage()
            .find_by_id(identity_id)
            .await
            .map_err(to_auth_error)?;
        Ok(row.map(|r| r.into_record()))
    }

    async fn update_refresh_token(
        &self,
        identity_id: &str,
        token: &RefreshToken,
    ) -> AuthResult<()> {
        self.storage()
            .set_refresh_token(identity_id, token)
            .await
            .map_err(to_auth_error)
    }

    async fn find_identity_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        let row = self
            .storage()
            .find_by_email(email)
            .await
            .map_err(to_auth_error)?;
        Ok(row.map(|r| r.identity()))
    }

    async fn rotate_refresh_token(
        &self,
        identity_id: &str,
        expected: &str,
        replacement: &RefreshToken,
    ) -> AuthResult<bool> {
        self.storage()
            .rotate_refresh_token(identity_id, expected, replacement)
            .await
            .map_err(to_auth_error)
    }

    async fn clear_refresh_token(&self, identity_id: &str) -> AuthResult<()> {
        self.storage()
            .clear_refresh_token(identity_id)
            .await
            .map_err(to_auth_error)
    }
}
