//! CLI commands and argument parsing.

pub mod apply;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Minder - supply chain security control plane client
#[derive(Parser)]
#[command(name = "minder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and logging options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Server host
    #[arg(long, env = "MINDER_GRPC_SERVER_HOST", global = true)]
    pub grpc_host: Option<String>,

    /// Server port
    #[arg(long, env = "MINDER_GRPC_SERVER_PORT", global = true)]
    pub grpc_port: Option<u16>,

    /// Connect without TLS
    #[arg(
        long,
        env = "MINDER_GRPC_SERVER_INSECURE",
        global = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub grpc_insecure: Option<bool>,

    /// Path to the client configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Access token (overrides the stored credentials)
    #[arg(long, env = "MINDER_AUTH_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create or update resources from manifests
    Apply(apply::ApplyArgs),

    /// Manage profiles
    #[command(subcommand)]
    Profile(ResourceCommands),

    /// Manage rule types
    #[command(subcommand)]
    Ruletype(ResourceCommands),

    /// Manage data sources
    #[command(subcommand)]
    Datasource(ResourceCommands),

    /// Print version information
    Version,
}

/// Commands available on a single resource kind.
#[derive(Subcommand)]
pub enum ResourceCommands {
    /// Create or update resources of this kind from manifests
    Apply(apply::ApplyArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_with_files() {
        let cli = Cli::try_parse_from([
            "minder", "apply", "-f", "a.yaml", "-f", "dir/", "extra.yaml", "-j", "proj",
        ])
        .unwrap();

        let Commands::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.files, vec!["a.yaml", "dir/"]);
        assert_eq!(args.positional, vec!["extra.yaml"]);
        assert_eq!(args.project.as_deref(), Some("proj"));
    }

    #[test]
    fn test_parse_kind_subcommand() {
        let cli = Cli::try_parse_from(["minder", "ruletype", "apply", "-f", "rt.yaml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ruletype(ResourceCommands::Apply(_))
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "minder",
            "apply",
            "-f",
            "-",
            "--grpc-host",
            "localhost",
            "--grpc-port",
            "8090",
            "--grpc-insecure",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.global.grpc_host.as_deref(), Some("localhost"));
        assert_eq!(cli.global.grpc_port, Some(8090));
        assert_eq!(cli.global.grpc_insecure, Some(true));
        assert!(cli.global.verbose);
    }

    #[test]
    fn test_parse_insecure_explicit_false() {
        let cli =
            Cli::try_parse_from(["minder", "--grpc-insecure=false", "apply", "-f", "x"]).unwrap();
        assert_eq!(cli.global.grpc_insecure, Some(false));
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        let result = Cli::try_parse_from(["minder", "apply", "-f", "x", "-o", "xml"]);
        assert!(result.is_err());
    }
}
