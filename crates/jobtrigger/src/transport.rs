//! HTTP transport used for every request the client makes.
//!
//! The client only needs two calls: an authenticated GET that returns status
//! and body, and an authenticated POST that returns the status. [`Transport`]
//! captures exactly that so tests and embedders can swap the network layer;
//! [`HttpTransport`] is the reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Url,
    header::{ACCEPT, CONTENT_TYPE},
};
use tracing::debug;

use crate::{
    connection::Credentials,
    error::{ConfigError, TransportError},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_ACCEPT: &str = "application/json";

/// Status and raw body of a GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network collaborator performing authenticated requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs an authenticated GET and returns the status and body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the request cannot be sent or
    /// the body cannot be read. A non-2xx status is not an error here.
    async fn get(
        &self,
        url: &Url,
        credentials: &Credentials,
    ) -> Result<TransportResponse, TransportError>;

    /// Performs an authenticated POST with no body and returns the status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the request cannot be sent.
    async fn post(&self, url: &Url, credentials: &Credentials) -> Result<u16, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Client`] if the underlying client cannot be
    /// built (for example when no TLS backend is available).
    pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { http })
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &Url,
        credentials: &Credentials,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url.clone())
            .basic_auth(credentials.user(), Some(credentials.token()))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, JSON_ACCEPT)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &Url,
        credentials: &Credentials,
    ) -> Result<TransportResponse, TransportError> {
        let request_error = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .request(reqwest::Method::GET, url, credentials)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(request_error)?.to_vec();
        debug!(%url, status, bytes = body.len(), "GET completed");

        Ok(TransportResponse { status, body })
    }

    async fn post(&self, url: &Url, credentials: &Credentials) -> Result<u16, TransportError> {
        let response = self
            .request(reqwest::Method::POST, url, credentials)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        debug!(%url, status, "POST completed");
        Ok(status)
    }
}
