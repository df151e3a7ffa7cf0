//! Server selection flags shared by every command.

use std::{fmt, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use jobtrigger::{Config, JobClient, ServerConfig};
use tracing::debug;

/// Connection flags. Each one overrides the matching `[server]` entry of the
/// config file.
#[derive(Args)]
pub struct ServerArgs {
    /// Path to a `jobtrigger.toml` (skips config file discovery).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root URL of the server.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// User name for basic authentication.
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// API token, or `env:NAME` to read it from the environment.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Suffix appended to endpoints for JSON documents (default `api/json`).
    #[arg(long, global = true)]
    pub api_suffix: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl fmt::Debug for ServerArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerArgs")
            .field("config", &self.config)
            .field("server", &self.server)
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_suffix", &self.api_suffix)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServerArgs {
    /// Settings from the config file with these flags applied on top.
    pub fn settings(&self) -> Result<ServerConfig> {
        let file = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => match Config::resolve().context("failed to load config")? {
                Some((path, config)) => {
                    debug!(path = %path.display(), "using config file");
                    config
                }
                None => Config::default(),
            },
        };

        Ok(file.server.merged_with(ServerConfig {
            url: self.server.clone(),
            api_suffix: self.api_suffix.clone(),
            user: self.user.clone(),
            token: self.token.clone(),
            timeout_secs: self.timeout,
        }))
    }

    pub fn client(&self) -> Result<JobClient> {
        self.settings()?
            .client()
            .context("invalid server configuration")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn args_with_config(path: PathBuf) -> ServerArgs {
        ServerArgs {
            config: Some(path),
            server: None,
            user: Some("flag-user".to_string()),
            token: None,
            api_suffix: None,
            timeout: None,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobtrigger.toml");
        fs::write(
            &path,
            "[server]\nurl = \"http://ci\"\nuser = \"file-user\"\ntoken = \"t\"\n",
        )
        .unwrap();

        let settings = args_with_config(path).settings().unwrap();

        assert_eq!(settings.url.as_deref(), Some("http://ci"));
        assert_eq!(settings.user.as_deref(), Some("flag-user"));
        assert_eq!(settings.token.as_deref(), Some("t"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let args = ServerArgs {
            token: Some("s3cret-token".to_string()),
            ..args_with_config(PathBuf::from("jobtrigger.toml"))
        };

        let rendered = format!("{args:?}");

        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("flag-user"));
        assert!(!rendered.contains("s3cret-token"));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let temp = TempDir::new().unwrap();
        let err = args_with_config(temp.path().join("nope.toml"))
            .settings()
            .unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }

    #[test]
    fn test_client_requires_token() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobtrigger.toml");
        fs::write(&path, "[server]\nurl = \"http://ci\"\n").unwrap();

        let err = args_with_config(path).client().unwrap_err();

        assert!(format!("{err:#}").contains("missing required setting: token"));
    }
}
