//! Parameter override flags shared by `trigger` and `params`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use jobtrigger::ParameterValue;

#[derive(Debug, Args)]
pub struct OverrideArgs {
    /// Parameter override as `NAME=VALUE`. Can be specified multiple times.
    /// Integers and `true`/`false` are sent typed; anything else as text.
    #[arg(short = 'p', long = "param")]
    pub params: Vec<String>,

    /// JSON object of parameter overrides. `--param` values take precedence.
    #[arg(long)]
    pub params_file: Option<PathBuf>,
}

impl OverrideArgs {
    /// Overrides in application order: file entries first, then flags.
    pub fn collect(&self) -> Result<Vec<(String, ParameterValue)>> {
        let mut overrides = Vec::new();

        if let Some(path) = &self.params_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read params file: {}", path.display()))?;
            let object: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&content).context("params file must be a JSON object")?;
            overrides.extend(object.into_iter().map(|(k, v)| (k, ParameterValue::from(v))));
        }

        for raw in &self.params {
            overrides.push(parse_param(raw)?);
        }

        Ok(overrides)
    }
}

fn parse_param(raw: &str) -> Result<(String, ParameterValue)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("invalid parameter '{raw}' (expected NAME=VALUE)"))?;
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "invalid parameter '{raw}': empty name");
    Ok((name.to_string(), ParameterValue::parse_literal(value)))
}
