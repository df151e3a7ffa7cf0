//! Trigger parameterized builds on a Jenkins-style job server.
//!
//! The server exposes jobs as a tree: folders contain job listings, jobs
//! declare parameters with defaults. This crate resolves a slash-delimited
//! job path to a job endpoint, merges caller overrides into the job's
//! declared defaults, and starts a build.
//!
//! # Key Components
//!
//! - **Resolution**: [`JobClient::resolve_job`] walks `folder/sub/job` one
//!   listing request per segment, matching names exactly.
//! - **Parameters**: [`ParameterSet::defaults_from`] reads declared defaults;
//!   [`ParameterSet::with_overrides`] replaces values case-insensitively and
//!   never adds undeclared names.
//! - **Triggering**: [`JobClient::trigger`] encodes the set as a query on the
//!   `buildWithParameters` endpoint and returns the raw HTTP status.
//! - **Transport**: [`Transport`] is the seam for network I/O;
//!   [`HttpTransport`] is the reqwest implementation.
//!
//! # Example
//!
//! ```no_run
//! use jobtrigger::{Credentials, JobClient, ServerConnection};
//!
//! # async fn example() -> Result<(), jobtrigger::Error> {
//! let connection = ServerConnection::new(
//!     "https://ci.example.com/",
//!     "api/json",
//!     Credentials::new("ci-bot", "token"),
//! )?;
//! let client = JobClient::new(connection);
//!
//! let outcome = client
//!     .trigger_job("team/service", [("env", "prod")])
//!     .await?;
//! println!("{} -> {}", outcome.job_url, outcome.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Each call issues its own requests and keeps no state between calls, so a
//! client can be reused for any number of resolutions. Operations are not
//! meant to be interleaved on one client from several threads; give each
//! caller its own client.

mod client;
mod config;
mod connection;
mod encoding;
mod error;
mod parameters;
mod resolver;
mod transport;
mod types;

pub use client::{JobClient, TriggerOutcome};
pub use config::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, Config, ServerConfig};
pub use connection::{
    Credentials, DEFAULT_API_SUFFIX, ServerConnection, TRIGGER_SUFFIX, trigger_url,
};
pub use encoding::{build_trigger_url, query_pairs};
pub use error::{ConfigError, DecodeError, Error, ResolutionError, Result, TransportError};
pub use parameters::{ParameterSet, ParameterValue};
pub use resolver::{JobPath, ResolutionState, ResolvedJob};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{
    BuildRef, DefaultParameterValue, JobListing, JobMetadata, JobProperty, JobRecord,
    ParameterDefinition,
};

/// Re-exported so embedders can name URLs without depending on reqwest.
pub use reqwest::Url;
