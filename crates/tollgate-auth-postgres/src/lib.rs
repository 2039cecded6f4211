//! PostgreSQL storage backend for tollgate-auth
//!
//! Reads identities and persists the digest of their current refresh token
//! in a single `app_user` table. Refresh rotation is a conditional update, so concurrent
//! refreshes of the same token yield at most one winner.
//!
//! # Example
//!
//! ```ignore
//! use tollgate_auth_postgres::PostgresSessionStorage;
//!
//! let storage = PostgresSessionStorage::connect("postgres://localhost/tollgate").await?;
//! storage.ensure_schema().await?;
//!
//! let service = SessionService::new(&config, Arc::new(storage.store()))?;
//! ```

pub mod session;
pub mod store;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use session::{SessionRow, SessionStorage};
pub use store::PostgresSessionStore;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Requested identity was not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if this is a database error.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Session Storage
// =============================================================================

/// Owns the connection pool and hands out storage views.
#[derive(Debug, Clone)]
pub struct PostgresSessionStorage {
    pool: Arc<PgPool>,
}

impl PostgresSessionStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new().connect(database_url).await?;
        tracing::info!("Connected to session database");
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create the session table if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        self.sessions().create_table_if_not_exists().await
    }

    /// Get session table operations.
    #[must_use]
    pub fn sessions(&self) -> SessionStorage<'_> {
        SessionStorage::new(&self.pool)
    }

    /// Get a store usable as `Arc<dyn SessionRecordStore>`.
    #[must_use]
    pub fn store(&self) -> PostgresSessionStore {
        PostgresSessionStore::new(Arc::clone(&self.pool))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_not_found() {
        let err = StorageError::not_found("Identity u1");
        assert!(err.is_not_found());
        assert!(!err.is_database_error());
        assert_eq!(err.to_string(), "Not found: Identity u1");
    }

    #[test]
    fn test_storage_error_database() {
        let err = StorageError::from(sqlx_core::Error::PoolTimedOut);
        assert!(err.is_database_error());
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let err = PostgresSessionStorage::connect("not-a-database-url")
            .await
            .unwrap_err();
        assert!(err.is_database_error());
    }
}
