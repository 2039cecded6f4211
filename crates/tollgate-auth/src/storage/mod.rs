//! Session record storage.
//!
//! This module defines the storage interface for per-identity refresh state
//! and a process-local implementation.
//!
//! # Implementations
//!
//! - [`InMemorySessionStore`] - DashMap-backed, for tests and the CLI
//! - `tollgate-auth-postgres` - PostgreSQL storage backend

pub mod memory;
pub mod session;

pub use memory::InMemorySessionStore;
pub use session::SessionRecordStore;
