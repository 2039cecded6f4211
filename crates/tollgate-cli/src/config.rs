use std::path::Path;

use anyhow::{Context, Result};
use tollgate_auth::SessionConfig;

use crate::output::print_warning;

/// Loads the session configuration from `path` plus `TOLLGATE__*` overrides.
///
/// A missing file is allowed so the environment alone can configure the CLI.
pub fn load(path: &Path) -> Result<SessionConfig> {
    if !path.exists() {
        print_warning(&format!(
            "Config file {} not found, using environment only",
            path.display()
        ));
    }

    SessionConfig::load(Some(path))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
