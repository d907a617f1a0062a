//! Minimal JSON-over-HTTP client for calling sibling services.
//!
//! Paths are resolved against a fixed base URL and every call that requires
//! authentication takes the caller's bearer token explicitly; the client
//! itself never stores a credential.

use std::fmt;
use std::time::Duration;

use reqwest::{header, Method, RequestBuilder};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// Default timeout for api clients
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Caller credential forwarded as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing bearer token for an authenticated request")]
    MissingCredential,

    #[error("invalid base url {0}")]
    InvalidUrl(String),

    #[error("error sending HTTP request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Error message reported by the remote service in its `{"error": ..}` body.
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("unable to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Outcome of a call folded into one envelope: the successful body, the
/// status code, and the failure if there was one.
#[derive(Debug)]
pub struct HttpResult {
    pub raw: Vec<u8>,
    pub code: u16,
    pub error: Option<ClientError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorResponse {
    error: String,
}

pub fn is_successful(status: u16) -> bool {
    status / 100 == 2
}

/// Fold a call result into an [`HttpResult`]. Non-2xx responses carry the
/// remote `error` text, or the decode error when the body is not an error
/// document.
pub fn handle(result: Result<RawResponse, ClientError>) -> HttpResult {
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            error!("apiclient handler: API request error: {}", err);
            let code = match err {
                ClientError::MissingCredential => 400,
                _ => 500,
            };
            return HttpResult { raw: Vec::new(), code, error: Some(err) };
        }
    };

    if !is_successful(response.status) {
        error!("apiclient handler: API request was unsuccessful: status code {}", response.status);
        let error = match serde_json::from_slice::<ErrorResponse>(&response.body) {
            Ok(body) => ClientError::Remote { status: response.status, message: body.error },
            Err(e) => {
                error!("apiclient handler unmarshaling error: {}", e);
                ClientError::Decode(e)
            }
        };
        return HttpResult { raw: Vec::new(), code: response.status, error: Some(error) };
    }

    HttpResult { raw: response.body, code: response.status, error: None }
}

pub struct ApiClient {
    base_url: Url,
    user_agent: String,
    http: reqwest::Client,
    timeout: Duration,
    requires_authentication: bool,
}

impl ApiClient {
    /// `timeout` of `None` or zero uses [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: &str, user_agent: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let timeout = timeout.filter(|t| !t.is_zero()).unwrap_or(DEFAULT_TIMEOUT);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            user_agent: user_agent.into(),
            http,
            timeout,
            requires_authentication: true,
        })
    }

    /// For services that take no credentials.
    pub fn without_authentication(mut self) -> Self {
        self.requires_authentication = false;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URL with `path` joined onto its path.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&join_path(self.base_url.path(), path));
        url
    }

    /// GET with `query` merged over the base URL's query; a key given in
    /// `query` replaces every base value for that key.
    pub async fn get(
        &self,
        token: Option<&BearerToken>,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, ClientError> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            let kept: Vec<(String, String)> = self
                .base_url
                .query_pairs()
                .filter(|(k, _)| !query.iter().any(|(q, _)| q == k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut().clear().extend_pairs(kept.iter().chain(query.iter()));
        }

        let request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.user_agent);
        self.execute(token, request).await
    }

    pub async fn post(&self, token: Option<&BearerToken>, path: &str, body: Vec<u8>) -> Result<RawResponse, ClientError> {
        self.execute(token, self.with_body(Method::POST, path, body)).await
    }

    pub async fn put(&self, token: Option<&BearerToken>, path: &str, body: Vec<u8>) -> Result<RawResponse, ClientError> {
        self.execute(token, self.with_body(Method::PUT, path, body)).await
    }

    pub async fn delete(&self, token: Option<&BearerToken>, path: &str, body: Vec<u8>) -> Result<RawResponse, ClientError> {
        self.execute(token, self.with_body(Method::DELETE, path, body)).await
    }

    fn with_body(&self, method: Method, path: &str, body: Vec<u8>) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .body(body)
    }

    /// Send a prepared request, attaching the bearer token when this client
    /// requires authentication.
    pub async fn execute(&self, token: Option<&BearerToken>, mut request: RequestBuilder) -> Result<RawResponse, ClientError> {
        if self.requires_authentication {
            let token = token.ok_or(ClientError::MissingCredential)?;
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await.map_err(|e| {
            debug!("Error sending HTTP request: {}", e);
            self.transport_error(e)
        })?;
        debug!("apiclient execute: {} {}", response.url(), response.status());

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(RawResponse { status, body: body.to_vec() })
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Transport(err)
        }
    }
}

/// Join two URL paths, collapsing empty and `.` segments and resolving `..`.
fn join_path(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths() {
        assert_eq!(join_path("/", "/check-role"), "/check-role");
        assert_eq!(join_path("/api/v1/", "check-role"), "/api/v1/check-role");
        assert_eq!(join_path("/api//v1", "./roles/../check-role/"), "/api/v1/check-role");
        assert_eq!(join_path("", ""), "/");
    }

    #[test]
    fn endpoint_keeps_base_query() {
        let client = ApiClient::new("http://localhost:8080/base?x=1", "test", None).unwrap();
        let url = client.endpoint("/check-role");
        assert_eq!(url.as_str(), "http://localhost:8080/base/check-role?x=1");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", "test", None),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com", "test", None),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn zero_timeout_uses_default() {
        let client = ApiClient::new("http://localhost", "test", Some(Duration::ZERO)).unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        let client = ApiClient::new("http://localhost", "test", Some(Duration::from_secs(3))).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9", "test", None).unwrap();
        let result = handle(client.post(None, "/check-role", b"[]".to_vec()).await);
        assert_eq!(result.code, 400);
        assert!(matches!(result.error, Some(ClientError::MissingCredential)));
    }

    #[test]
    fn handle_success_keeps_body() {
        let result = handle(Ok(RawResponse { status: 200, body: b"\"ok\"".to_vec() }));
        assert_eq!(result.code, 200);
        assert_eq!(result.raw, b"\"ok\"");
        assert!(result.error.is_none());
    }

    #[test]
    fn handle_failure_surfaces_remote_error() {
        let result = handle(Ok(RawResponse {
            status: 404,
            body: br#"{"error":"token not found"}"#.to_vec(),
        }));
        assert_eq!(result.code, 404);
        assert!(result.raw.is_empty());
        match result.error {
            Some(ClientError::Remote { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "token not found");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn handle_failure_with_garbage_body_reports_decode_error() {
        let result = handle(Ok(RawResponse { status: 502, body: b"<html>".to_vec() }));
        assert_eq!(result.code, 502);
        assert!(matches!(result.error, Some(ClientError::Decode(_))));
    }

    #[test]
    fn token_debug_is_redacted() {
        assert_eq!(format!("{:?}", BearerToken::new("secret")), "BearerToken(***)");
    }
}
