//! # tollgate-auth
//!
//! Access/refresh token session core.
//!
//! This crate provides:
//! - Short-lived HS256 access tokens carrying subject, email and a unique id
//! - Opaque, server-recorded refresh tokens
//! - Refresh with atomic rotation: a refresh token works exactly once
//! - A storage trait plus an in-memory implementation
//!
//! ## Overview
//!
//! Clients hold an access token for ordinary requests. When it expires they
//! present it together with their refresh token and receive a new pair; the
//! old refresh token is invalidated by that exchange. Refresh failures never
//! tell the caller why they failed.
//!
//! ## Modules
//!
//! - [`config`] - Secrets, issuer/audience and token lifetimes
//! - [`token`] - Codec, issuer, refresh coordinator and session service
//! - [`storage`] - Session record storage trait and in-memory store
//! - [`types`] - Identities, refresh tokens and credential pairs
//! - [`clock`] - Injectable time source

pub mod clock;
pub mod config;
pub mod error;
pub mod storage;
pub mod token;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SessionConfig};
pub use error::{AuthError, DenyReason, ErrorCategory};
pub use storage::{InMemorySessionStore, SessionRecordStore};
pub use token::{
    AccessTokenClaims, AccessTokenIssuer, ClaimsCodec, ExpiryCheck, JwtError, RefreshCoordinator,
    SessionService,
};
pub use types::{CredentialPair, Identity, RefreshToken, SessionRecord, StoredRefreshToken};

/// Type alias for session operation results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tollgate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{ConfigError, SessionConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::storage::{InMemorySessionStore, SessionRecordStore};
    pub use crate::token::{AccessTokenClaims, ExpiryCheck, SessionService};
    pub use crate::types::{CredentialPair, Identity, RefreshToken, SessionRecord};
}
