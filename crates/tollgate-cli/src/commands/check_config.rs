use anyhow::Result;
use serde_json::json;
use tollgate_auth::SessionConfig;

use crate::cli::OutputFormat;
use crate::output::{print_success, print_value};

/// Prints the loaded configuration with the secret reduced to its length.
pub fn check_config(config: &SessionConfig, format: OutputFormat) -> Result<()> {
    print_value(&summary(config), format);
    if let Some(message) = confirmation(format) {
        print_success(message);
    }
    Ok(())
}

/// JSON output stays a single parseable document.
fn confirmation(format: OutputFormat) -> Option<&'static str> {
    match format {
        OutputFormat::Text => Some("Configuration is valid"),
        OutputFormat::Json => None,
    }
}

fn summary(config: &SessionConfig) -> serde_json::Value {
    json!({
        "issuer": config.issuer,
        "audience": config.audience,
        "signingSecret": format!("<{} bytes>", config.secret_bytes().len()),
        "accessTokenLifetime": humantime::format_duration(config.access_token_lifetime).to_string(),
        "refreshTokenLifetime": humantime::format_duration(config.refresh_token_lifetime).to_string(),
    })
}
