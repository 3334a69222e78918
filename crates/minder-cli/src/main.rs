//! Minder CLI - command-line client for the Minder control plane.

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use minder_core::ResourceKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod connection;
mod output;

use commands::{Cli, Commands, ResourceCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // Logs go to stderr; stdout is reserved for results
    let default_directive = if cli.global.verbose {
        "minder=debug"
    } else {
        "minder=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Apply(args) => {
            let paths = commands::apply::input_paths(&matches);
            commands::apply::execute(&cli.global, &args, &paths, None).await
        }
        Commands::Profile(ResourceCommands::Apply(args)) => {
            let paths = commands::apply::input_paths(&matches);
            commands::apply::execute(&cli.global, &args, &paths, Some(ResourceKind::Profile))
                .await
        }
        Commands::Ruletype(ResourceCommands::Apply(args)) => {
            let paths = commands::apply::input_paths(&matches);
            commands::apply::execute(&cli.global, &args, &paths, Some(ResourceKind::RuleType))
                .await
        }
        Commands::Datasource(ResourceCommands::Apply(args)) => {
            let paths = commands::apply::input_paths(&matches);
            commands::apply::execute(&cli.global, &args, &paths, Some(ResourceKind::DataSource))
                .await
        }
        Commands::Version => {
            println!("minder {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
