//! Command-line client for triggering parameterized Jenkins builds.
//!
//! Usage:
//! ```bash
//! jobtrigger trigger team/service -p env=prod   # Trigger a build
//! jobtrigger params team/service -p env=prod    # Show the parameters that would be sent
//! jobtrigger resolve team/service               # Print the resolved job URL
//! jobtrigger last-build team/service            # Print the most recent build URL
//! ```
//!
//! Server settings come from `jobtrigger.toml` and can be overridden with
//! `--server`, `--user`, `--token` and `--api-suffix`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod server;

#[derive(Debug, Parser)]
#[command(name = "jobtrigger")]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    server: server::ServerArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a job, apply parameter overrides and trigger a build
    Trigger(commands::trigger::TriggerArgs),

    /// Show the parameters a trigger would send, without triggering
    Params(commands::params::ParamsArgs),

    /// Print the URL a job path resolves to
    Resolve(commands::resolve::ResolveArgs),

    /// Print the URL of a job's most recent build
    LastBuild(commands::last_build::LastBuildArgs),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trigger(_) => f.debug_tuple("Trigger").finish(),
            Self::Params(_) => f.debug_tuple("Params").finish(),
            Self::Resolve(_) => f.debug_tuple("Resolve").finish(),
            Self::LastBuild(_) => f.debug_tuple("LastBuild").finish(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().context("failed to parse log directive")?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = cli.server.client()?;

    match &cli.command {
        Command::Trigger(args) => commands::trigger::run(&client, args).await,
        Command::Params(args) => commands::params::run(&client, args).await,
        Command::Resolve(args) => commands::resolve::run(&client, args).await,
        Command::LastBuild(args) => commands::last_build::run(&client, args).await,
    }
}
