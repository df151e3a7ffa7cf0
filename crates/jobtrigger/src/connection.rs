//! Server connection settings and endpoint URL composition.

use std::fmt;

use reqwest::Url;

use crate::error::ConfigError;

/// API suffix used when none is configured.
pub const DEFAULT_API_SUFFIX: &str = "api/json";

/// Sub-path that starts a parameterized build.
pub const TRIGGER_SUFFIX: &str = "buildWithParameters";

/// HTTP Basic credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    token: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            token: token.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Immutable description of the server a client talks to.
///
/// Holds the validated root URL, the API suffix appended to every metadata
/// fetch, and the credentials. The endpoint reached while resolving a job is
/// not stored here; see [`crate::resolver::ResolutionState`].
///
/// A connection is plain data and can be cloned freely. It is not meant to be
/// shared mutably between threads; build one per caller.
#[derive(Debug, Clone)]
pub struct ServerConnection {
    root: Url,
    api_suffix: String,
    credentials: Credentials,
}

impl ServerConnection {
    /// Validates `server` and builds a connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `server` is not an absolute URL
    /// and [`ConfigError::UnsupportedScheme`] if its scheme is not http or
    /// https.
    pub fn new(
        server: &str,
        api_suffix: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ConfigError> {
        let root = parse_http_url(server.trim()).map_err(|reason| match reason {
            UrlRejection::Scheme(scheme) => ConfigError::UnsupportedScheme {
                url: server.to_string(),
                scheme,
            },
            UrlRejection::Syntax(reason) => ConfigError::InvalidUrl {
                url: server.to_string(),
                reason,
            },
        })?;

        Ok(Self {
            root,
            api_suffix: api_suffix.into(),
            credentials,
        })
    }

    /// Root endpoint: the top-level job listing.
    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn api_suffix(&self) -> &str {
        &self.api_suffix
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// URL fetched to read the JSON document behind `endpoint`.
    pub fn api_url(&self, endpoint: &Url) -> Url {
        join_path(endpoint, &self.api_suffix)
    }
}

/// URL that triggers a build of the job at `endpoint`, without a query.
pub fn trigger_url(endpoint: &Url) -> Url {
    join_path(endpoint, TRIGGER_SUFFIX)
}

/// Appends `suffix` to the path of `endpoint` with exactly one `/` between.
///
/// Any query or fragment on `endpoint` is dropped.
pub(crate) fn join_path(endpoint: &Url, suffix: &str) -> Url {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);

    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(suffix.trim_start_matches('/'));
    url.set_path(&path);
    url
}

pub(crate) enum UrlRejection {
    Scheme(String),
    Syntax(String),
}

/// Parses an absolute http(s) URL.
pub(crate) fn parse_http_url(raw: &str) -> Result<Url, UrlRejection> {
    let url = Url::parse(raw).map_err(|e| UrlRejection::Syntax(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlRejection::Scheme(other.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlRejection::Syntax("missing host".to_string()));
    }
    Ok(url)
}
