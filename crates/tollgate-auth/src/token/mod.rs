//! Token generation, validation, and rotation.
//!
//! This module provides:
//!
//! - JWT encoding and decoding ([`jwt`])
//! - Credential pair issuance ([`issuer`])
//! - Refresh token rotation ([`refresh`])
//! - The session facade ([`service`])

pub mod issuer;
pub mod jwt;
pub mod refresh;
pub mod service;

pub use issuer::AccessTokenIssuer;
pub use jwt::{AccessTokenClaims, ClaimsCodec, ExpiryCheck, JwtError, SIGNING_ALGORITHM};
pub use refresh::RefreshCoordinator;
pub use service::SessionService;
