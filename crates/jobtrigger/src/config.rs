//! Configuration file support.
//!
//! Server settings live in `jobtrigger.toml`:
//!
//! ```toml
//! [server]
//! url = "https://ci.example.com/"
//! api_suffix = "api/json"
//! user = "ci-bot"
//! token = "env:CI_TOKEN"
//! timeout_secs = 30
//! ```
//!
//! # Resolution Algorithm
//!
//! 1. `JOBTRIGGER_CONFIG_PATH` environment variable
//! 2. Current directory
//! 3. Parent directories (walk up to filesystem root)
//! 4. XDG config directory (`~/.config/jobtrigger/jobtrigger.toml`)
//!
//! A missing file is not an error. Values of the form `env:NAME` are read
//! from the environment when the client is built.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    client::JobClient,
    connection::{Credentials, DEFAULT_API_SUFFIX, ServerConnection},
    error::ConfigError,
    transport::HttpTransport,
};

/// File name searched for during resolution.
pub const CONFIG_FILE_NAME: &str = "jobtrigger.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "JOBTRIGGER_CONFIG_PATH";

/// Contents of `jobtrigger.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// The `[server]` table.
///
/// Every field is optional so that command-line flags can fill gaps; see
/// [`ServerConfig::merged_with`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root URL of the server.
    pub url: Option<String>,

    /// Suffix appended to an endpoint to fetch its JSON document.
    pub api_suffix: Option<String>,

    pub user: Option<String>,

    /// API token, literal or `env:NAME`.
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("api_suffix", &self.api_suffix)
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Loads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if:
    /// - The file cannot be read
    /// - The file cannot be parsed as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Finds and loads the config file using the resolution order above.
    ///
    /// Returns the path that was loaded alongside the config, or `None` if no
    /// file exists anywhere.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if a file was found but could not be read
    /// or parsed.
    pub fn resolve() -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from)
            && path.exists()
        {
            let config = Self::load(&path)?;
            return Ok(Some((path, config)));
        }

        if let Ok(current) = std::env::current_dir()
            && let Some(found) = Self::resolve_from(&current)?
        {
            return Ok(Some(found));
        }

        if let Some(path) = xdg_config_path()
            && path.exists()
        {
            let config = Self::load(&path)?;
            return Ok(Some((path, config)));
        }

        Ok(None)
    }

    /// Looks for the config file in `start` and then each of its ancestors.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if the nearest file cannot be read or
    /// parsed.
    pub fn resolve_from(start: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        for dir in start.ancestors() {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                let config = Self::load(&path)?;
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }
}

impl ServerConfig {
    /// Returns `self` with every field set in `overrides` replaced.
    #[must_use]
    pub fn merged_with(self, overrides: ServerConfig) -> Self {
        Self {
            url: overrides.url.or(self.url),
            api_suffix: overrides.api_suffix.or(self.api_suffix),
            user: overrides.user.or(self.user),
            token: overrides.token.or(self.token),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Validates the settings and builds a [`ServerConnection`].
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if the URL, user or token is missing, an
    /// `env:` reference is unset, or the URL is invalid.
    pub fn connection(&self) -> Result<ServerConnection, ConfigError> {
        let url = self.url.as_deref().ok_or(ConfigError::Missing("server url"))?;
        let user = self.user.as_deref().ok_or(ConfigError::Missing("user"))?;
        let token = self.token.as_deref().ok_or(ConfigError::Missing("token"))?;

        ServerConnection::new(
            url,
            self.api_suffix.as_deref().unwrap_or(DEFAULT_API_SUFFIX),
            Credentials::new(resolve_value(user)?, resolve_value(token)?),
        )
    }

    /// Builds a client over the reqwest transport, honouring `timeout_secs`.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::connection`]; also fails if the HTTP client cannot
    /// be built.
    pub fn client(&self) -> Result<JobClient, ConfigError> {
        let connection = self.connection()?;
        let transport = match self.timeout_secs {
            Some(secs) => HttpTransport::with_timeout(Duration::from_secs(secs))?,
            None => HttpTransport::new(),
        };
        Ok(JobClient::with_transport(connection, transport))
    }
}

/// Expands `env:NAME` to the variable's value; other values pass through.
fn resolve_value(value: &str) -> Result<String, ConfigError> {
    match value.strip_prefix("env:") {
        Some(name) => std::env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_string())),
        None => Ok(value.to_string()),
    }
}

fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jobtrigger").join(CONFIG_FILE_NAME))
}
