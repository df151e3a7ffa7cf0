//! `jobtrigger resolve` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use jobtrigger::{JobClient, Transport};

/// Arguments for the `resolve` command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Job path, e.g. "deploy" or "team/service".
    pub job: String,
}

pub async fn run<T: Transport>(client: &JobClient<T>, args: &ResolveArgs) -> Result<()> {
    let job = client
        .resolve_job(&args.job)
        .await
        .with_context(|| format!("failed to resolve {}", args.job))?;

    println!("{}", job.endpoint);
    Ok(())
}
