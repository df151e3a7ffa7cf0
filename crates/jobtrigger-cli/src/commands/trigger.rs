//! `jobtrigger trigger` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use jobtrigger::{JobClient, Transport};

use super::overrides::OverrideArgs;

/// Arguments for the `trigger` command.
#[derive(Debug, Args)]
pub struct TriggerArgs {
    /// Job path, e.g. "deploy" or "team/service".
    pub job: String,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

pub async fn run<T: Transport>(client: &JobClient<T>, args: &TriggerArgs) -> Result<()> {
    let overrides = args.overrides.collect()?;

    println!(
        "{} Triggering job: {}",
        style("→").cyan(),
        style(&args.job).bold()
    );

    let outcome = client
        .trigger_job(&args.job, overrides)
        .await
        .with_context(|| format!("failed to trigger {}", args.job))?;

    for (name, value) in &outcome.parameters {
        let shown = value.encode().unwrap_or_else(|| "(not sent)".to_string());
        println!("  {} = {}", style(name).dim(), shown);
    }

    let status = outcome.status;
    if (200..300).contains(&status) {
        println!(
            "{} Build triggered at {} (HTTP {status})",
            style("✓").green().bold(),
            outcome.job_url
        );
        Ok(())
    } else {
        println!("{} Server answered HTTP {status}", style("✗").red().bold());
        anyhow::bail!("trigger of {} returned HTTP {status}", args.job)
    }
}
