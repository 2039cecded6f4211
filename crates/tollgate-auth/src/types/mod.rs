//! Domain types shared across the session core.
//!
//! - [`Identity`] - the authenticated principal, owned by the credential store
//! - [`RefreshToken`] - opaque refresh token value with its expiry
//! - [`SessionRecord`] - per-identity refresh state held by the session store
//! - [`StoredRefreshToken`] - the hashed form of a refresh token kept on record
//! - [`CredentialPair`] - access/refresh pair returned to authentication flows

pub mod credentials;
pub mod identity;
pub mod refresh_token;
pub mod session_record;

pub use credentials::CredentialPair;
pub use identity::Identity;
pub use refresh_token::RefreshToken;
pub use session_record::{SessionRecord, StoredRefreshToken};
