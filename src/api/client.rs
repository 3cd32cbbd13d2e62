//! dbt Cloud HTTP client and single-call transport

use log::debug;
use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Duration;

use crate::api::cancel::CancelSignal;
use crate::api::envelope::status_reports_failure;
use crate::api::settings::ClientConfig;
use crate::config::{api, defaults};
use crate::error::{ApiError, Result};

/// API version segment in URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V2,
    V3,
}

impl ApiVersion {
    fn segment(self) -> &'static str {
        match self {
            ApiVersion::V2 => "v2",
            ApiVersion::V3 => "v3",
        }
    }
}

/// One HTTP request, immutable once built
///
/// Headers are attached by the transport, so a request can be replayed as-is
/// on every retry attempt.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// POST with a JSON body
    pub fn post<B: Serialize + ?Sized>(url: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::POST, url).with_json(body)
    }

    /// PATCH with a JSON body
    pub fn patch<B: Serialize + ?Sized>(url: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::PATCH, url).with_json(body)
    }

    fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// dbt Cloud API client
///
/// Holds the pooled connection and the read-only configuration. Cloning is
/// cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DbtCloudClient {
    client: Client,
    config: ClientConfig,
    /// Signal used by operations that do not take one explicitly
    cancel: CancelSignal,
}

impl DbtCloudClient {
    /// Create a new client with pooled connection settings
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            // Connection pool settings - reuse connections
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            // TCP keepalive to maintain connections
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            cancel: CancelSignal::never(),
        }
    }

    /// Bind a default cancel signal used by the convenience operations
    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Build an account-scoped URL, e.g. `{host}/v3/accounts/{id}/projects/`
    pub fn account_url(&self, version: ApiVersion, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.config.host_url(),
            version.segment(),
            api::ACCOUNTS,
            self.config.account_id(),
            path.trim_start_matches('/')
        )
    }

    /// Add standard headers to a request builder
    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Accept", api::CONTENT_TYPE)
            .header("Content-Type", api::CONTENT_TYPE)
            .header("Authorization", format!("Token {}", self.config.token()))
            .header(
                "User-Agent",
                concat!("dbtcloud-api/", env!("CARGO_PKG_VERSION")),
            )
            // Fresh budget for every attempt
            .timeout(self.config.timeout())
    }

    /// Execute one request without retrying
    ///
    /// Returns the body of a 2xx response. Any other status, and a 2xx whose
    /// envelope `status.code` is 400 or above, is returned as
    /// `ApiError::Status` carrying the raw body.
    pub async fn send_once(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        debug!("{} {}", request.method(), request.url());

        let mut builder = self.with_headers(
            self.client
                .request(request.method().clone(), request.url()),
        );
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            "{} {} -> {} ({} bytes)",
            request.method(),
            request.url(),
            status.as_u16(),
            body.len()
        );

        if !status.is_success() || status_reports_failure(&body) {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}

#[cfg(test)]
impl DbtCloudClient {
    /// Create a test client against a mock server, with fast retries
    pub fn test_client(base_url: &str) -> Self {
        use crate::api::settings::RetryPolicy;

        Self::new(
            ClientConfig::new(base_url, 1, "test-token")
                .with_timeout(Duration::from_secs(5))
                .with_retry_policy(RetryPolicy::new(
                    3,
                    Duration::from_millis(10),
                    vec![429, 500],
                )),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_account_url() {
        let client = DbtCloudClient::new(ClientConfig::for_default_host(12, "token"));
        assert_eq!(
            client.account_url(ApiVersion::V3, "/projects/"),
            "https://cloud.getdbt.com/api/v3/accounts/12/projects/"
        );
        assert_eq!(
            client.account_url(ApiVersion::V2, "jobs/7/"),
            "https://cloud.getdbt.com/api/v2/accounts/12/jobs/7/"
        );
    }

    #[test]
    fn test_request_post_serializes_body() {
        let request = ApiRequest::post("http://x/", &serde_json::json!({"name": "a"})).unwrap();
        assert_eq!(request.method(), &Method::POST);
        let body: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
        assert_eq!(body["name"], "a");
    }

    #[test]
    fn test_request_get_has_no_body() {
        let request = ApiRequest::get("http://x/");
        assert!(request.body().is_none());
        assert_eq!(request.url(), "http://x/");
    }

    #[tokio::test]
    async fn test_send_once_attaches_headers() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("Authorization", "Token test-token"))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/ping", mock_server.uri());
        let body = client.send_once(&ApiRequest::get(url)).await.unwrap();
        assert_eq!(body, b"{}");
    }

    #[tokio::test]
    async fn test_send_once_sends_json_body() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/things"))
            .and(body_json(serde_json::json!({"name": "thing"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/things", mock_server.uri());
        let request = ApiRequest::post(url, &serde_json::json!({"name": "thing"})).unwrap();
        assert!(client.send_once(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_once_non_success_is_error_with_body() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        match client.send_once(&ApiRequest::get(url)).await.unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "nope");
            }
            other => panic!("Expected ApiError::Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_once_ok_status_with_failed_envelope_is_error() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/soft-fail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": null,
                "status": {"code": 500, "is_success": false,
                           "user_message": "Internal error", "developer_message": ""}
            })))
            .mount(&mock_server)
            .await;

        let url = format!("{}/soft-fail", mock_server.uri());
        match client.send_once(&ApiRequest::get(url)).await.unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains("Internal error"));
            }
            other => panic!("Expected ApiError::Status, got {:?}", other),
        }
    }
}
