//! Authenticated principal.

use serde::{Deserialize, Serialize};

/// An authenticated principal.
///
/// Identities are created and owned by the external credential store. The
/// session core only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable unique identifier (`sub` claim).
    pub id: String,

    /// Email address (`email` claim), used to resolve tokens back to identities.
    pub email: String,

    /// Display name.
    pub name: String,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }
}
