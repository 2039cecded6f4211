//! In-memory session record store.
//!
//! Backs the CLI and tests. Records live in a [`DashMap`] keyed by identity
//! id; rotation holds the entry's shard lock across compare and write, so
//! two concurrent rotations of the same value cannot both succeed.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::session::SessionRecordStore;
use crate::types::{Identity, RefreshToken, SessionRecord, StoredRefreshToken};

/// Identity plus its refresh state.
#[derive(Debug, Clone)]
struct Entry {
    identity: Identity,
    refresh_token: Option<StoredRefreshToken>,
}

/// Process-local [`SessionRecordStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    /// Entries keyed by identity id
    entries: DashMap<String, Entry>,
    /// Lowercased email -> identity id
    email_index: DashMap<String, String>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identity with no refresh token on record.
    ///
    /// Re-registering an id replaces its identity and clears its session.
    pub fn insert_identity(&self, identity: Identity) {
        if let Some(previous) = self.entries.get(&identity.id) {
            let stale = previous.identity.email.to_lowercase();
            drop(previous);
            self.email_index.remove(&stale);
        }

        self.email_index
            .insert(identity.email.to_lowercase(), identity.id.clone());
        self.entries.insert(
            identity.id.clone(),
            Entry {
                identity,
                refresh_token: None,
            },
        );
    }

    /// Number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no identities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionRecordStore for InMemorySessionStore {
    async fn find(&self, identity_id: &str) -> AuthResult<Option<SessionRecord>> {
        Ok(self.entries.get(identity_id).map(|entry| SessionRecord {
            identity_id: identity_id.to_string(),
            refresh_token: entry.refresh_token.clone(),
        }))
    }

    async fn update_refresh_token(
        &self,
        identity_id: &str,
        token: &RefreshToken,
    ) -> AuthResult<()> {
        let mut entry = self
            .entries
            .get_mut(identity_id)
            .ok_or_else(|| AuthError::storage(format!("Unknown identity: {}", identity_id)))?;
        entry.refresh_token = Some(StoredRefreshToken::from_token(token));
        Ok(())
    }

    async fn find_identity_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        let Some(id) = self
            .email_index
            .get(&email.to_lowercase())
            .map(|id| id.value().clone())
        else {
            return Ok(None);
        };

        Ok(self.entries.get(&id).map(|entry| entry.identity.clone()))
    }

    async fn rotate_refresh_token(
        &self,
        identity_id: &str,
        expected: &str,
        replacement: &RefreshToken,
    ) -> AuthResult<bool> {
        let Some(mut entry) = self.entries.get_mut(identity_id) else {
            return Ok(false);
        };

        let current_matches = entry
            .refresh_token
            .as_ref()
            .is_some_and(|current| current.matches(expected));

        if current_matches {
            entry.refresh_token = Some(StoredRefreshToken::from_token(replacement));
        }
        Ok(current_matches)
    }

    async fn clear_refresh_token(&self, identity_id: &str) -> AuthResult<()> {
        if let Some(mut entry) = self.entries.get_mut(identity_id) {
            entry.refresh_token = None;
        }
        Ok(())
    }
}
