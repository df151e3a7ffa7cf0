//! `jobtrigger last-build` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use jobtrigger::{JobClient, Transport};

/// Arguments for the `last-build` command.
#[derive(Debug, Args)]
pub struct LastBuildArgs {
    /// Job path, e.g. "deploy" or "team/service".
    pub job: String,
}

pub async fn run<T: Transport>(client: &JobClient<T>, args: &LastBuildArgs) -> Result<()> {
    let job = client
        .resolve_job(&args.job)
        .await
        .with_context(|| format!("failed to resolve {}", args.job))?;
    let url = client
        .last_build_url(&job)
        .await
        .with_context(|| format!("failed to read builds of {}", args.job))?;

    println!("{url}");
    Ok(())
}
