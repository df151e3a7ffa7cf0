//! `jobtrigger params` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use jobtrigger::{JobClient, Transport};

use super::overrides::OverrideArgs;

/// Arguments for the `params` command.
#[derive(Debug, Args)]
pub struct ParamsArgs {
    /// Job path, e.g. "deploy" or "team/service".
    pub job: String,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

pub async fn run<T: Transport>(client: &JobClient<T>, args: &ParamsArgs) -> Result<()> {
    let overrides = args.overrides.collect()?;

    let job = client
        .resolve_job(&args.job)
        .await
        .with_context(|| format!("failed to resolve {}", args.job))?;
    let params = client
        .parameters_for(&job, overrides)
        .await
        .with_context(|| format!("failed to read parameters of {}", args.job))?;

    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
