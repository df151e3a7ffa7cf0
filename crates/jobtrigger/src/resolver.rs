//! Job path resolution.
//!
//! A job path such as `team/service` is resolved by reading the job listing at
//! the server root, following the entry named `team`, reading the listing
//! there, and following `service`. Each step yields a new
//! [`ResolutionState`]; nothing is mutated in place, so the same client can
//! resolve any number of paths.

use std::fmt;

use reqwest::Url;
use tracing::{debug, info, instrument};

use crate::{
    client::JobClient,
    error::{ResolutionError, Result},
    transport::Transport,
    types::JobListing,
};

/// A slash-delimited job path with at least one segment.
///
/// Segments are kept verbatim: matching is exact and case-sensitive, so an
/// empty segment (as in `a//b`) only matches an entry whose name is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPath {
    segments: Vec<String>,
}

impl JobPath {
    /// Splits `path` on `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::EmptyPath`] if `path` is empty.
    pub fn parse(path: &str) -> std::result::Result<Self, ResolutionError> {
        if path.is_empty() {
            return Err(ResolutionError::EmptyPath);
        }
        Ok(Self {
            segments: path.split('/').map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for JobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Position reached while walking a job path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionState {
    endpoint: Url,
    depth: usize,
}

impl ResolutionState {
    pub fn at_root(root: Url) -> Self {
        Self {
            endpoint: root,
            depth: 0,
        }
    }

    /// Endpoint whose listing the next segment is matched against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Number of segments consumed so far.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Moves to the first entry of `listing` named exactly `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidSegment`] if no entry matches, or a
    /// decode error if the matching entry's URL is not a valid http(s) URL.
    pub fn descend(&self, listing: &JobListing, segment: &str) -> Result<Self> {
        let record = listing
            .find(segment)
            .ok_or_else(|| ResolutionError::InvalidSegment {
                segment: segment.to_string(),
                endpoint: self.endpoint.to_string(),
            })?;
        let endpoint = record.endpoint()?;
        debug!(segment, url = %endpoint, "matched path segment");

        Ok(Self {
            endpoint,
            depth: self.depth + 1,
        })
    }
}

/// A job path together with the endpoint it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedJob {
    pub path: JobPath,
    pub endpoint: Url,
}

impl<T: Transport> JobClient<T> {
    /// Resolves `path` to a job endpoint, one listing request per segment.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::EmptyPath`] for an empty path.
    /// - [`ResolutionError::NoJobs`] if a listing along the way is empty.
    /// - [`ResolutionError::InvalidSegment`] if a segment has no match.
    /// - Transport and decode errors from the listing fetches.
    #[instrument(skip(self))]
    pub async fn resolve_job(&self, path: &str) -> Result<ResolvedJob> {
        let path = JobPath::parse(path)?;
        let last = path.segments().len() - 1;

        let mut state = ResolutionState::at_root(self.connection().root().clone());
        let mut listing = self.fetch_listing(state.endpoint()).await?;

        for (index, segment) in path.segments().iter().enumerate() {
            state = state.descend(&listing, segment)?;
            if index < last {
                listing = self.fetch_listing(state.endpoint()).await?;
            }
        }

        info!(job = %path, url = %state.endpoint(), "resolved job");
        Ok(ResolvedJob {
            path,
            endpoint: state.endpoint,
        })
    }

    async fn fetch_listing(&self, endpoint: &Url) -> Result<JobListing> {
        let url = self.connection().api_url(endpoint);
        let listing = JobListing::decode(self.fetch_json(&url).await?, &url)?;
        if listing.is_empty() {
            return Err(ResolutionError::NoJobs {
                endpoint: endpoint.to_string(),
            }
            .into());
        }
        Ok(listing)
    }
}
