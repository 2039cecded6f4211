use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tollgate_auth::{Identity, InMemorySessionStore, SessionConfig, SessionService};

use crate::cli::{IssueArgs, OutputFormat};
use crate::output::{print_success, print_value};

/// Issues a credential pair against a throwaway in-memory session store.
///
/// The refresh token is not persisted anywhere once the command exits.
pub async fn issue(config: &SessionConfig, args: &IssueArgs, format: OutputFormat) -> Result<()> {
    let identity = Identity::new(&args.id, &args.email, &args.name);

    let store = Arc::new(InMemorySessionStore::new());
    store.insert_identity(identity.clone());

    let service = SessionService::new(config, store).context("Invalid session configuration")?;
    let pair = service
        .login(&identity)
        .await
        .context("Failed to issue credentials")?;

    let value = serde_json::to_value(&pair).context("Failed to serialize credentials")?;
    print_value(&value, format);

    if matches!(format, OutputFormat::Text) {
        print_success(&format!("Issued credentials for {}", identity.email.cyan()));
    }
    Ok(())
}
