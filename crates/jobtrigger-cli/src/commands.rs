//! Command implementations for the `jobtrigger` CLI.
//!
//! - **`trigger`**: Resolve a job, overlay parameter overrides, start a build
//! - **`params`**: Print the parameter set a trigger would send
//! - **`resolve`**: Print the endpoint a job path resolves to
//! - **`last_build`**: Print the URL of a job's most recent build
//!
//! Each command module exports an `*Args` struct implementing `clap::Args`
//! and an async `run(&JobClient, &Args) -> Result<()>`.

pub mod last_build;
pub mod overrides;
pub mod params;
pub mod resolve;
pub mod trigger;
