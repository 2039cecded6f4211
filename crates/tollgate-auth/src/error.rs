//! Session core error types.
//!
//! [`AuthError`] is the only error type that crosses the crate boundary.
//! Refresh failures collapse into [`AuthError::RefreshDenied`]; the specific
//! [`DenyReason`] is reported through `tracing` and never returned to callers.

use std::fmt;

use crate::config::ConfigError;
use crate::token::jwt::JwtError;

/// Errors that can occur during session operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The access token is malformed, forged, or was issued for another
    /// issuer/audience/algorithm.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The access token has expired. Recoverable only through refresh.
    #[error("Token expired")]
    TokenExpired,

    /// The refresh attempt was denied. The caller must re-authenticate.
    #[error("Refresh denied")]
    RefreshDenied,

    /// An error occurred while reading or writing session records.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The session configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. } | Self::TokenExpired | Self::RefreshDenied
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this is a token-related error.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(self, Self::InvalidToken { .. } | Self::TokenExpired)
    }

    /// Returns `true` if the caller has to perform a full re-authentication.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::InvalidToken { .. } | Self::RefreshDenied)
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidToken { .. } => ErrorCategory::Token,
            Self::TokenExpired => ErrorCategory::Token,
            Self::RefreshDenied => ErrorCategory::Authentication,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 style error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken { .. } => "invalid_token",
            Self::TokenExpired => "invalid_token",
            Self::RefreshDenied => "invalid_grant",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }
}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// Categories of session errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (refresh denial).
    Authentication,
    /// Token-related errors (validation, expiration).
    Token,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Server-side reason a refresh attempt was denied.
///
/// Only ever logged. Callers see [`AuthError::RefreshDenied`].
#[derive(Debug, thiserror::Error)]
pub enum DenyReason {
    /// The presented access token failed decoding or verification.
    #[error("access token rejected: {0}")]
    InvalidAccessToken(#[source] JwtError),

    /// No identity is registered for the token's email claim.
    #[error("no identity for token email")]
    UnknownIdentity,

    /// The identity resolved by email does not own the token's subject id.
    #[error("token subject does not match stored identity")]
    SubjectMismatch,

    /// No refresh token is on record for the identity.
    #[error("no session on record")]
    NoSession,

    /// The presented refresh token is not the one on record.
    #[error("refresh token mismatch")]
    RefreshTokenMismatch,

    /// The refresh token on record has expired.
    #[error("refresh token expired")]
    RefreshTokenExpired,

    /// A concurrent refresh rotated the token first.
    #[error("refresh token rotated concurrently")]
    RotationConflict,

    /// The session store failed; the attempt fails closed.
    #[error("session store failure: {0}")]
    Store(#[source] AuthError),

    /// Minting the replacement pair failed.
    #[error("credential issuance failed: {0}")]
    Issuance(#[source] AuthError),
}

impl DenyReason {
    /// Short machine-readable label for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAccessToken(_) => "invalid_access_token",
            Self::UnknownIdentity => "unknown_identity",
            Self::SubjectMismatch => "subject_mismatch",
            Self::NoSession => "no_session",
            Self::RefreshTokenMismatch => "refresh_token_mismatch",
            Self::RefreshTokenExpired => "refresh_token_expired",
            Self::RotationConflict => "rotation_conflict",
            Self::Store(_) => "store_failure",
            Self::Issuance(_) => "issuance_failure",
        }
    }
}
