//! Session core configuration.
//!
//! All secrets, identifiers and lifetimes consumed by the codec and issuer are
//! carried in an explicit [`SessionConfig`] handed to constructors.
//!
//! # Example (TOML)
//!
//! ```toml
//! signing_secret = "change-me-to-a-long-random-string-of-32+-bytes"
//! issuer = "https://auth.example.com"
//! audience = "https://api.example.com"
//! access_token_lifetime = "10m"
//! refresh_token_lifetime = "7d"
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum accepted length of the HMAC signing secret, in bytes (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Environment variable prefix for configuration overrides,
/// e.g. `TOLLGATE__ISSUER=https://auth.example.com`.
pub const ENV_PREFIX: &str = "TOLLGATE";

/// Configuration for token issuance and verification.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Symmetric key for HS256 signatures. Never logged.
    pub signing_secret: String,

    /// Token issuer (`iss` claim), checked on every decode.
    pub issuer: String,

    /// Token audience (`aud` claim), checked on every decode.
    pub audience: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime. Must be strictly longer than the access lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            issuer: "http://localhost:8080".to_string(),
            audience: "http://localhost:8080".to_string(),
            access_token_lifetime: Duration::from_secs(600), // 10 minutes
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish()
    }
}

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl SessionConfig {
    /// Creates a configuration with default lifetimes.
    #[must_use]
    pub fn new(
        signing_secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ..Self::default()
        }
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Returns the signing secret as raw key bytes.
    #[must_use]
    pub fn secret_bytes(&self) -> &[u8] {
        self.signing_secret.as_bytes()
    }

    /// Access lifetime as a `time::Duration`.
    #[must_use]
    pub fn access_lifetime(&self) -> time::Duration {
        to_time_duration(self.access_token_lifetime)
    }

    /// Refresh lifetime as a `time::Duration`.
    #[must_use]
    pub fn refresh_lifetime(&self) -> time::Duration {
        to_time_duration(self.refresh_token_lifetime)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the signing secret is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - issuer or audience is empty
    /// - the signing secret is shorter than [`MIN_SECRET_LEN`] bytes
    /// - the access token lifetime is zero
    /// - the refresh token lifetime is not longer than the access lifetime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::Missing("signing_secret".to_string()));
        }

        if self.signing_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "signing_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.audience.is_empty() {
            return Err(ConfigError::InvalidValue(
                "audience cannot be empty".to_string(),
            ));
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.refresh_token_lifetime <= self.access_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be longer than access_token_lifetime".to_string(),
            ));
        }

        Ok(())
    }

    /// Loads configuration from an optional TOML file overlaid with
    /// `TOLLGATE__*` environment variables, then validates it.
    ///
    /// A path that does not exist is skipped, so environment-only setups work.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path
            && path.exists()
        {
            builder = builder.add_source(::config::File::from(path));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX).separator("__"),
        );

        let loaded: Self = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        loaded.validate()?;
        Ok(loaded)
    }
}

fn to_time_duration(duration: Duration) -> time::Duration {
    time::Duration::try_from(duration).unwrap_or(time::Duration::MAX)
}
