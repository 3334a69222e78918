//! Apply command: create or update resources from manifest files.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgMatches, Args};
use minder_apply::grpc::GrpcControlPlane;
use minder_apply::{cancellation, ApplyConfig, Pipeline};
use minder_core::ResourceKind;
use tracing::{debug, warn};

use super::GlobalArgs;
use crate::config::{self, ClientConfig};
use crate::connection;
use crate::output::{self, OutputFormat};

/// Arguments for the apply commands.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Manifest files or directories
    #[arg(value_name = "PATH")]
    pub positional: Vec<String>,

    /// Manifest file or directory, or `-` for standard input (repeatable)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// Project to create the resources in
    #[arg(short = 'j', long, env = "MINDER_PROJECT")]
    pub project: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Timeout for each call, in seconds
    #[arg(long, default_value = "30")]
    pub rpc_timeout: u64,

    /// Timeout for the whole run, in seconds
    #[arg(long, default_value = "300")]
    pub timeout: u64,
}

/// Path arguments in command-line order, whether given with `-f` or
/// positionally.
///
/// `matches` may be the top-level matches; the innermost subcommand is used.
pub fn input_paths(matches: &ArgMatches) -> Vec<String> {
    let mut leaf = matches;
    while let Some((_, sub)) = leaf.subcommand() {
        leaf = sub;
    }

    let mut indexed: Vec<(usize, String)> = ["files", "positional"]
        .into_iter()
        .flat_map(|id| {
            let indices = leaf.indices_of(id).into_iter().flatten();
            let values = leaf.get_many::<String>(id).into_iter().flatten().cloned();
            indices.zip(values)
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, path)| path).collect()
}

/// Execute an apply command, optionally restricted to one resource kind.
pub async fn execute(
    global: &GlobalArgs,
    args: &ApplyArgs,
    paths: &[String],
    kind: Option<ResourceKind>,
) -> Result<()> {
    let client_config = ClientConfig::load(global.config.as_deref())?.with_overrides(global);
    let apply_config = build_apply_config(args, client_config.project.as_deref(), kind);
    debug!(
        server = %client_config.grpc_server.to_uri(),
        project = ?apply_config.project,
        "starting apply"
    );

    let channel = connection::connect(&client_config)?;
    let mut client = GrpcControlPlane::new(channel);
    if let Some(token) = config::resolve_token(global.auth_token.as_deref())? {
        client = client
            .with_bearer_token(&token)
            .context("Access token is not valid header text")?;
    }

    let (handle, cancellation) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the current call");
            handle.cancel();
        }
    });

    let report = Pipeline::new(client, apply_config)
        .with_cancellation(cancellation)
        .run(paths, Box::new(std::io::stdin()))
        .await;

    for skipped in &report.skipped {
        eprintln!("{skipped}");
    }
    output::render(&report.results, args.output, &mut std::io::stdout().lock())?;

    match report.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn build_apply_config(
    args: &ApplyArgs,
    default_project: Option<&str>,
    kind: Option<ResourceKind>,
) -> ApplyConfig {
    let mut builder = ApplyConfig::builder()
        .rpc_timeout(Duration::from_secs(args.rpc_timeout))
        .total_timeout(Duration::from_secs(args.timeout));

    if let Some(project) = args.project.as_deref().or(default_project) {
        builder = builder.project(project);
    }
    if let Some(kind) = kind {
        builder = builder.only(kind);
    }

    builder.build()
}
