//! The job client: metadata fetches, parameter overlay, and triggering.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    connection::ServerConnection,
    encoding::build_trigger_url,
    error::{DecodeError, Result, TransportError},
    parameters::{ParameterSet, ParameterValue},
    resolver::ResolvedJob,
    transport::{HttpTransport, Transport},
    types::JobMetadata,
};

/// Outcome of a full resolve-and-trigger run.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerOutcome {
    /// Endpoint of the job that was triggered.
    pub job_url: String,
    /// Parameters that were sent.
    pub parameters: ParameterSet,
    /// Raw HTTP status of the trigger request.
    pub status: u16,
}

/// Client for one server.
///
/// Every operation issues fresh requests; no response is cached between
/// calls. The client holds no mutable state.
#[derive(Debug, Clone)]
pub struct JobClient<T = HttpTransport> {
    connection: ServerConnection,
    transport: T,
}

impl JobClient<HttpTransport> {
    /// Creates a client using the default reqwest transport.
    pub fn new(connection: ServerConnection) -> Self {
        Self::with_transport(connection, HttpTransport::new())
    }
}

impl<T: Transport> JobClient<T> {
    pub fn with_transport(connection: ServerConnection, transport: T) -> Self {
        Self {
            connection,
            transport,
        }
    }

    pub fn connection(&self) -> &ServerConnection {
        &self.connection
    }

    /// GETs `url` and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request fails, the status is not
    /// 2xx, or the body is not JSON.
    pub async fn fetch_json(&self, url: &Url) -> Result<Value> {
        let response = self
            .transport
            .get(url, self.connection.credentials())
            .await?;

        if !response.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status,
            }
            .into());
        }

        serde_json::from_slice(&response.body).map_err(|source| {
            TransportError::InvalidJson {
                url: url.to_string(),
                source,
            }
            .into()
        })
    }

    /// Fetches and decodes the metadata document of `job`.
    ///
    /// # Errors
    ///
    /// Transport errors from the fetch, or [`DecodeError`] if the document has
    /// no `property` list.
    pub async fn job_metadata(&self, job: &ResolvedJob) -> Result<JobMetadata> {
        let url = self.connection.api_url(&job.endpoint);
        let document = self.fetch_json(&url).await?;
        Ok(JobMetadata::decode(document, &url)?)
    }

    /// Declared default parameters of `job`.
    ///
    /// # Errors
    ///
    /// See [`JobClient::job_metadata`].
    #[instrument(skip_all, fields(job = %job.path))]
    pub async fn default_parameters(&self, job: &ResolvedJob) -> Result<ParameterSet> {
        let metadata = self.job_metadata(job).await?;
        let defaults = ParameterSet::defaults_from(&metadata);
        debug!(count = defaults.len(), "computed default parameters");
        Ok(defaults)
    }

    /// Defaults of `job` with caller overrides applied.
    ///
    /// Override names are matched case-insensitively against the declared
    /// names; undeclared names are dropped.
    ///
    /// # Errors
    ///
    /// See [`JobClient::job_metadata`].
    pub async fn parameters_for<I, K, V>(&self, job: &ResolvedJob, overrides: I) -> Result<ParameterSet>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParameterValue>,
    {
        Ok(self.default_parameters(job).await?.with_overrides(overrides))
    }

    /// POSTs a build of `job` with `params` and returns the raw status.
    ///
    /// The status is not interpreted: 4xx and 5xx come back as values, not
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if no response was received.
    #[instrument(skip_all, fields(job = %job.path))]
    pub async fn trigger(&self, job: &ResolvedJob, params: &ParameterSet) -> Result<u16> {
        let url = build_trigger_url(&job.endpoint, params);
        let status = self
            .transport
            .post(&url, self.connection.credentials())
            .await?;
        info!(status, "triggered build");
        Ok(status)
    }

    /// URL of the most recent build of `job`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NoBuilds`] if the job lists no builds, or a
    /// decode error if the URL is malformed.
    pub async fn last_build_url(&self, job: &ResolvedJob) -> Result<Url> {
        let metadata = self.job_metadata(job).await?;
        let build = metadata
            .builds
            .as_deref()
            .unwrap_or_default()
            .first()
            .ok_or_else(|| DecodeError::NoBuilds {
                url: job.endpoint.to_string(),
            })?;

        Url::parse(&build.url).map_err(|_| {
            DecodeError::InvalidUrl {
                shape: "job metadata",
                url: build.url.clone(),
            }
            .into()
        })
    }

    /// Resolves `path`, overlays `overrides` on its defaults, and triggers a
    /// build.
    ///
    /// # Errors
    ///
    /// Any error from resolution, the metadata fetch, or the trigger request.
    pub async fn trigger_job<I, K, V>(&self, path: &str, overrides: I) -> Result<TriggerOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParameterValue>,
    {
        let job = self.resolve_job(path).await?;
        let parameters = self.parameters_for(&job, overrides).await?;
        let status = self.trigger(&job, &parameters).await?;

        Ok(TriggerOutcome {
            job_url: job.endpoint.to_string(),
            parameters,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{basic_auth, method, path, query_param},
    };

    use super::*;
    use crate::{
        connection::{Credentials, DEFAULT_API_SUFFIX},
        error::Error,
        resolver::JobPath,
        transport::TransportResponse,
    };

    fn connection(uri: &str) -> ServerConnection {
        ServerConnection::new(
            uri,
            DEFAULT_API_SUFFIX,
            Credentials::new("test-user", "test-token"),
        )
        .unwrap()
    }

    fn job_at(endpoint: &str) -> ResolvedJob {
        ResolvedJob {
            path: JobPath::parse("app").unwrap(),
            endpoint: Url::parse(endpoint).unwrap(),
        }
    }

    async fn mount_json(server: &MockServer, at: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(at))
            .and(basic_auth("test-user", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    /// Records requests and replays canned GET bodies keyed by URL.
    #[derive(Default)]
    struct RecordingTransport {
        documents: HashMap<String, Value>,
        post_status: u16,
        requests: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn get(
            &self,
            url: &Url,
            _credentials: &Credentials,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(format!("GET {url}"));
            Ok(match self.documents.get(url.as_str()) {
                Some(document) => TransportResponse {
                    status: 200,
                    body: serde_json::to_vec(document).unwrap(),
                },
                None => TransportResponse {
                    status: 404,
                    body: Vec::new(),
                },
            })
        }

        async fn post(
            &self,
            url: &Url,
            _credentials: &Credentials,
        ) -> std::result::Result<u16, TransportError> {
            self.requests.lock().unwrap().push(format!("POST {url}"));
            Ok(self.post_status)
        }
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let client = JobClient::new(connection(&server.uri()));
        let url = Url::parse(&format!("{}/api/json", server.uri())).unwrap();
        let err = client.fetch_json(&url).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Transport(TransportError::InvalidJson { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "nope"})))
            .mount(&server)
            .await;

        let client = JobClient::new(connection(&server.uri()));
        let url = Url::parse(&format!("{}/api/json", server.uri())).unwrap();
        let err = client.fetch_json(&url).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Transport(TransportError::Status { status: 401, .. })
        ));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_parameters_for_applies_overrides() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/job/app/api/json",
            json!({"property": [{"parameterDefinitions": [
                {"defaultParameterValue": {"name": "ENV", "value": "staging"}}
            ]}]}),
        )
        .await;

        let client = JobClient::new(connection(&server.uri()));
        let job = job_at(&format!("{}/job/app/", server.uri()));
        let params = client
            .parameters_for(&job, [("env", json!("prod")), ("extra", json!("x"))])
            .await
            .unwrap();

        assert_eq!(params, ParameterSet::from_iter([("ENV", "prod")]));
    }

    #[tokio::test]
    async fn test_missing_property_is_decode_error() {
        let server = MockServer::start().await;
        mount_json(&server, "/job/app/api/json", json!({"name": "app"})).await;

        let client = JobClient::new(connection(&server.uri()));
        let job = job_at(&format!("{}/job/app/", server.uri()));
        let err = client.default_parameters(&job).await.unwrap_err();

        assert!(matches!(err, Error::Decode(DecodeError::Shape { .. })));
    }

    #[tokio::test]
    async fn test_trigger_returns_raw_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/app/buildWithParameters"))
            .and(basic_auth("test-user", "test-token"))
            .and(query_param("ENV", "prod"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = JobClient::new(connection(&server.uri()));
        let job = job_at(&format!("{}/job/app/", server.uri()));
        let status = client
            .trigger(&job, &ParameterSet::from_iter([("ENV", "prod")]))
            .await
            .unwrap();

        assert_eq!(status, 201);
    }

    #[tokio::test]
    async fn test_trigger_does_not_interpret_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = JobClient::new(connection(&server.uri()));
        let job = job_at(&format!("{}/job/app/", server.uri()));
        let status = client.trigger(&job, &ParameterSet::new()).await.unwrap();

        assert_eq!(status, 500);
    }

    #[tokio::test]
    async fn test_last_build_url_reads_first_build() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/job/app/api/json",
            json!({
                "property": [],
                "builds": [
                    {"number": 12, "url": "http://ci/job/app/12/"},
                    {"number": 11, "url": "http://ci/job/app/11/"}
                ]
            }),
        )
        .await;

        let client = JobClient::new(connection(&server.uri()));
        let job = job_at(&format!("{}/job/app/", server.uri()));
        let url = client.last_build_url(&job).await.unwrap();

        assert_eq!(url.as_str(), "http://ci/job/app/12/");
    }

    #[tokio::test]
    async fn test_last_build_url_without_builds_is_decode_error() {
        let server = MockServer::start().await;
        mount_json(&server, "/job/app/api/json", json!({"property": [], "builds": []})).await;

        let client = JobClient::new(connection(&server.uri()));
        let job = job_at(&format!("{}/job/app/", server.uri()));
        let err = client.last_build_url(&job).await.unwrap_err();

        assert!(matches!(err, Error::Decode(DecodeError::NoBuilds { .. })));
    }

    #[tokio::test]
    async fn test_trigger_job_runs_full_flow_over_http() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_json(
            &server,
            "/api/json",
            json!({"jobs": [{"name": "team", "url": format!("{base}/job/team/")}]}),
        )
        .await;
        mount_json(
            &server,
            "/job/team/api/json",
            json!({"jobs": [{"name": "service", "url": format!("{base}/job/team/job/service/")}]}),
        )
        .await;
        mount_json(
            &server,
            "/job/team/job/service/api/json",
            json!({"property": [{"parameterDefinitions": [
                {"defaultParameterValue": {"name": "COUNT", "value": 1}},
                {"defaultParameterValue": {"name": "DRYRUN", "value": false}},
                {"defaultParameterValue": {"name": "TARGET", "value": "staging"}}
            ]}]}),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/job/team/job/service/buildWithParameters"))
            .and(query_param("COUNT", "3"))
            .and(query_param("DRYRUN", "true"))
            .and(query_param("TARGET", "prod"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = JobClient::new(connection(&base));
        let outcome = client
            .trigger_job(
                "team/service",
                [
                    ("count", json!(3)),
                    ("dryrun", json!(true)),
                    ("Target", json!("prod")),
                ],
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, 201);
        assert_eq!(outcome.job_url, format!("{base}/job/team/job/service/"));
        assert_eq!(outcome.parameters.len(), 3);
    }

    #[tokio::test]
    async fn test_each_operation_issues_fresh_requests() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let transport = RecordingTransport {
            documents: HashMap::from([
                (
                    "http://ci/api/json".to_string(),
                    json!({"jobs": [{"name": "app", "url": "http://ci/job/app/"}]}),
                ),
                (
                    "http://ci/job/app/api/json".to_string(),
                    json!({"property": [{"parameterDefinitions": [
                        {"defaultParameterValue": {"name": "ENV", "value": "staging"}}
                    ]}]}),
                ),
            ]),
            post_status: 201,
            requests: Arc::clone(&requests),
        };
        let client = JobClient::with_transport(connection("http://ci"), transport);

        let first = client.trigger_job("app", [("env", "prod")]).await.unwrap();
        let second = client.trigger_job("app", [("env", "qa")]).await.unwrap();

        assert_eq!(first.status, 201);
        assert_eq!(second.parameters.get("ENV"), Some(&ParameterValue::from("qa")));
        assert_eq!(
            *requests.lock().unwrap(),
            vec![
                "GET http://ci/api/json",
                "GET http://ci/job/app/api/json",
                "POST http://ci/job/app/buildWithParameters?ENV=prod",
                "GET http://ci/api/json",
                "GET http://ci/job/app/api/json",
                "POST http://ci/job/app/buildWithParameters?ENV=qa",
            ]
        );
    }
}
