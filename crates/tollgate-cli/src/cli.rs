use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tollgate")]
#[command(about = "Tollgate CLI: issue and inspect session tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the session configuration file (TOML)
    #[arg(
        short,
        long,
        global = true,
        env = "TOLLGATE_CONFIG",
        default_value = "tollgate.toml"
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a credential pair for an identity
    Issue(IssueArgs),
    /// Verify an access token and print its claims
    Inspect(InspectArgs),
    /// Validate the configuration and print a redacted summary
    CheckConfig,
}

#[derive(clap::Args)]
pub struct IssueArgs {
    /// Identity id (`sub` claim)
    #[arg(long)]
    pub id: String,
    /// Identity email
    #[arg(long)]
    pub email: String,
    /// Display name
    #[arg(long, default_value = "")]
    pub name: String,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Access token to verify
    pub token: String,
    /// Accept an expired token (all other checks still apply)
    #[arg(long)]
    pub allow_expired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inspect_flags() {
        let cli = Cli::try_parse_from(["tollgate", "inspect", "abc.def.ghi", "--allow-expired"])
            .unwrap();
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.token, "abc.def.ghi");
                assert!(args.allow_expired);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn parses_issue_with_global_config() {
        let cli = Cli::try_parse_from([
            "tollgate",
            "issue",
            "--id",
            "u1",
            "--email",
            "a@b.com",
            "--config",
            "/etc/tollgate.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/tollgate.toml"));
        match cli.command {
            Commands::Issue(args) => {
                assert_eq!(args.id, "u1");
                assert_eq!(args.name, "");
            }
            _ => panic!("expected issue"),
        }
    }
}
