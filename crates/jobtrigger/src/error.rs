//! Error types for job resolution and triggering.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every fallible operation.
///
/// Every variant is terminal for the operation that produced it. Nothing in
/// this crate retries or degrades; callers decide what to do next.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server connection or a config file is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request could not be completed or its body was unreadable.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A job path could not be resolved against the server's listings.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A response did not have the expected JSON shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors raised while building a connection or loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The server URL could not be parsed.
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server URL uses a scheme other than http or https.
    #[error("unsupported scheme '{scheme}' in server url '{url}'")]
    UnsupportedScheme { url: String, scheme: String },

    /// A required setting was not provided by any source.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// An `env:NAME` reference points at an unset variable.
    #[error("environment variable '{0}' is not set")]
    MissingEnv(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),

    /// I/O error when reading a config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error when a config file is malformed.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised by the HTTP transport or while reading a response body.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered a fetch with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The response body was not valid JSON.
    #[error("response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while walking a job path.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolutionError {
    /// The job path was empty.
    #[error("job path is empty")]
    EmptyPath,

    /// A listing along the path contained no jobs.
    #[error("no jobs found at {endpoint}")]
    NoJobs { endpoint: String },

    /// No listing entry matched a path segment.
    #[error("invalid path segment '{segment}' (no job with that name at {endpoint})")]
    InvalidSegment { segment: String, endpoint: String },
}

/// Errors raised when a response lacks the expected shape.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The payload could not be mapped onto the expected structure.
    #[error("unexpected {shape} payload from {url}: {source}")]
    Shape {
        shape: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A URL inside the payload could not be parsed.
    #[error("invalid url '{url}' in {shape} payload")]
    InvalidUrl { shape: &'static str, url: String },

    /// The job has no recorded builds.
    #[error("no builds recorded for {url}")]
    NoBuilds { url: String },
}
