//! Identity session table.
//!
//! Each identity row carries the SHA-256 digest of its current refresh token
//! and that token's expiry:
//!
//! ```sql
//! CREATE TABLE app_user (
//!     id TEXT PRIMARY KEY,
//!     email TEXT NOT NULL,
//!     name TEXT NOT NULL,
//!     refresh_token_hash TEXT NULL,
//!     refresh_token_expires_at TIMESTAMPTZ NULL
//! );
//! ```
//!
//! Rows are provisioned by the credential store; this module only reads
//! identities and writes refresh state.
//!
//! Rotation is a conditional `UPDATE ... WHERE refresh_token_hash = $expected`;
//! only one of several concurrent rotations of the same value can match.

use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::instrument;

use tollgate_auth::types::{Identity, RefreshToken, SessionRecord, StoredRefreshToken};

use crate::{PgPool, StorageError, StorageResult};

// =============================================================================
// Types
// =============================================================================

type RowTuple = (
    String,
    String,
    String,
    Option<String>,
    Option<OffsetDateTime>,
);

/// Identity row from the database.
#[derive(Debug, Clone)]
pub struct SessionRow {
    /// Identity id
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// SHA-256 digest of the refresh token on record
    pub refresh_token_hash: Option<String>,
    /// Refresh token expiry
    pub refresh_token_expires_at: Option<OffsetDateTime>,
}

impl SessionRow {
    fn from_tuple(row: RowTuple) -> Self {
        Self {
            id: row.0,
            email: row.1,
            name: row.2,
            refresh_token_hash: row.3,
            refresh_token_expires_at: row.4,
        }
    }

    /// The identity part of the row.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.email.clone(), self.name.clone())
    }

    /// The session part of the row.
    ///
    /// A token without an expiry is treated as absent.
    #[must_use]
    pub fn into_record(self) -> SessionRecord {
        let refresh_token = match (self.refresh_token_hash, self.refresh_token_expires_at) {
            (Some(hash), Some(expires_at)) => Some(StoredRefreshToken::new(hash, expires_at)),
            _ => None,
        };

        SessionRecord {
            identity_id: self.id,
            refresh_token,
        }
    }
}

// =============================================================================
// Session Storage
// =============================================================================

/// Session storage operations on the `app_user` table.
pub struct SessionStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionStorage<'a> {
    /// Create a new session storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a row by identity id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> StorageResult<Option<SessionRow>> {
        let row: Option<RowTuple> = query_as(
            r#"
            SELECT id, email, name, refresh_token_hash, refresh_token_expires_at
            FROM app_user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(SessionRow::from_tuple))
    }

    /// Find a row by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self, email))]
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<SessionRow>> {
        let row: Option<RowTuple> = query_as(
            r#"
            SELECT id, email, name, refresh_token_hash, refresh_token_expires_at
            FROM app_user
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(SessionRow::from_tuple))
    }

    /// Overwrite the refresh token on record with the digest of `token`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the identity doesn't exist.
    #[instrument(skip(self, token))]
    pub async fn set_refresh_token(&self, id: &str, token: &RefreshToken) -> StorageResult<()> {
        let stored = StoredRefreshToken::from_token(token);
        let result = query(
            r#"
            UPDATE app_user
            SET refresh_token_hash = $2,
                refresh_token_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&stored.token_hash)
        .bind(stored.expires_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("Identity {}", id)));
        }

        Ok(())
    }

    /// Replace the refresh token only if the digest on record is still the
    /// digest of `expected`.
    ///
    /// Returns `true` if exactly one row was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    #[instrument(skip(self, expected, replacement))]
    pub async fn rotate_refresh_token(
        &self,
        id: &str,
        expected: &str,
        replacement: &RefreshToken,
    ) -> StorageResult<bool> {
        let stored = StoredRefreshToken::from_token(replacement);
        let result = query(
            r#"
            UPDATE app_user
            SET refresh_token_hash = $3,
                refresh_token_expires_at = $4
            WHERE id = $1
              AND refresh_token_hash = $2
            "#,
        )
        .bind(id)
        .bind(RefreshToken::hash_value(expected))
        .bind(&stored.token_hash)
        .bind(stored.expires_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Clear the refresh token on record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    #[instrument(skip(self))]
    pub async fn clear_refresh_token(&self, id: &str) -> StorageResult<()> {
        query(
            r#"
            UPDATE app_user
            SET refresh_token_hash = NULL,
                refresh_token_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Create the `app_user` table.
    /// Should be called during bootstrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    #[instrument(skip(self))]
    pub async fn create_table_if_not_exists(&self) -> StorageResult<()> {
        query(
            r#"
            CREATE TABLE IF NOT EXISTS app_user (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                refresh_token_hash TEXT NULL,
                refresh_token_expires_at TIMESTAMPTZ NULL
            )
            "#,
        )
        .execute(self.pool)
        .await?;

        // Lookups by email are case-insensitive
        query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_app_user_email_lower
            ON app_user (lower(email))
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row(token_hash: Option<&str>, expires_at: Option<OffsetDateTime>) -> SessionRow {
        SessionRow::from_tuple((
            "u1".to_string(),
            "a@b.com".to_string(),
            "Alice".to_string(),
            token_hash.map(String::from),
            expires_at,
        ))
    }

    #[test]
    fn test_row_with_token() {
        let expires_at = datetime!(2024-01-08 00:00 UTC);
        let digest = RefreshToken::hash_value("r1");
        let record = row(Some(&digest), Some(expires_at)).into_record();

        assert_eq!(record.identity_id, "u1");
        let token = record.refresh_token.unwrap();
        assert!(token.matches("r1"));
        assert_eq!(token.expires_at, expires_at);
    }

    #[test]
    fn test_row_without_token() {
        assert!(row(None, None).into_record().refresh_token.is_none());
    }

    #[test]
    fn test_token_without_expiry_is_absent() {
        assert!(row(Some("r1"), None).into_record().refresh_token.is_none());
        assert!(
            row(None, Some(datetime!(2024-01-08 00:00 UTC)))
                .into_record()
                .refresh_token
                .is_none()
        );
    }

    #[test]
    fn test_row_identity() {
        let identity = row(None, None).identity();
        assert_eq!(identity, Identity::new("u1", "a@b.com", "Alice"));
    }
}
