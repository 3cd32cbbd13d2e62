//! Bounded retry around the single-call transport

use log::{debug, warn};

use crate::api::cancel::CancelSignal;
use crate::api::classify::{classify, ErrorClass};
use crate::api::client::{ApiRequest, DbtCloudClient};
use crate::api::settings::RetryPolicy;
use crate::error::{ApiError, Result};

/// Whether attempt number `attempt` (1-based) may be followed by another one
fn should_retry(class: ErrorClass, attempt: u32, policy: &RetryPolicy) -> bool {
    class.is_retryable() && attempt < policy.max_attempts()
}

impl DbtCloudClient {
    /// Execute a request with the client's retry policy and cancel signal
    pub async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        self.execute_with(request, self.config().retry_policy(), self.cancel_signal())
            .await
    }

    /// Execute a request, retrying transient failures up to the policy bound
    ///
    /// Non-transient failures return immediately. Once attempts run out the
    /// last classified error is returned unchanged. The signal aborts both
    /// in-flight calls and inter-attempt delays.
    pub async fn execute_with(
        &self,
        request: &ApiRequest,
        policy: &RetryPolicy,
        cancel: &CancelSignal,
    ) -> Result<Vec<u8>> {
        let mut attempt: u32 = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(ApiError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                outcome = self.send_once(request) => outcome,
            };

            let err = match outcome {
                Ok(body) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", request.url(), attempt);
                    }
                    return Ok(body);
                }
                Err(e) => e,
            };

            let (class, err) = classify(err, policy.retryable_codes());
            if !should_retry(class, attempt, policy) {
                if class.is_retryable() {
                    warn!(
                        "{} {} failed after {} attempt(s): {}",
                        request.method(),
                        request.url(),
                        attempt,
                        err
                    );
                }
                return Err(err);
            }

            warn!(
                "{} {} attempt {}/{} failed, retrying in {:?}: {}",
                request.method(),
                request.url(),
                attempt,
                policy.max_attempts(),
                policy.interval(),
                err
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                _ = tokio::time::sleep(policy.interval()) => {}
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::cancel::CancelHandle;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(code: i64, user_message: &str) -> serde_json::Value {
        serde_json::json!({
            "data": null,
            "status": {
                "code": code,
                "is_success": code < 300,
                "user_message": user_message,
                "developer_message": ""
            }
        })
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    #[test]
    fn test_should_retry_bounds() {
        let policy = RetryPolicy::new(3, Duration::ZERO, vec![500]);
        assert!(should_retry(ErrorClass::Transient, 1, &policy));
        assert!(should_retry(ErrorClass::Transient, 2, &policy));
        assert!(!should_retry(ErrorClass::Transient, 3, &policy));
        assert!(!should_retry(ErrorClass::Fatal, 1, &policy));
        assert!(!should_retry(ErrorClass::NotFound, 1, &policy));
        assert!(!should_retry(ErrorClass::NotFoundPermission, 1, &policy));
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500).set_body_json(envelope(500, "boom")))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, "ok")))
            .mount(&mock_server)
            .await;

        let url = format!("{}/flaky", mock_server.uri());
        let result = client.execute(&ApiRequest::get(url)).await;

        assert!(result.is_ok());
        assert_eq!(request_count(&mock_server).await, 2);
    }

    #[tokio::test]
    async fn test_ok_status_with_retryable_envelope_code_is_retried() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/soft"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(500, "boom")))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/soft"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, "ok")))
            .mount(&mock_server)
            .await;

        let url = format!("{}/soft", mock_server.uri());
        let result = client.execute(&ApiRequest::get(url)).await;

        assert!(result.is_ok());
        assert_eq!(request_count(&mock_server).await, 2);
    }

    #[tokio::test]
    async fn test_ok_status_with_fatal_envelope_code_is_not_retried() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/soft-denied"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(403, "denied")))
            .mount(&mock_server)
            .await;

        let url = format!("{}/soft-denied", mock_server.uri());
        let err = client.execute(&ApiRequest::get(url)).await.unwrap_err();

        assert_eq!(request_count(&mock_server).await, 1);
        match err {
            ApiError::Api {
                http_status, code, ..
            } => {
                assert_eq!(http_status, 200);
                assert_eq!(code, 403);
            }
            other => panic!("Expected ApiError::Api, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts_with_last_error() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(429).set_body_json(envelope(429, "slow down")))
            .mount(&mock_server)
            .await;

        let url = format!("{}/down", mock_server.uri());
        let err = client.execute(&ApiRequest::get(url)).await.unwrap_err();

        assert_eq!(request_count(&mock_server).await, 3);
        match err {
            ApiError::Api {
                code, user_message, ..
            } => {
                assert_eq!(code, 429);
                assert_eq!(user_message, "slow down");
            }
            other => panic!("Expected ApiError::Api, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_short_circuits_without_sleeping() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());
        let slow_policy = RetryPolicy::new(5, Duration::from_secs(60), vec![500]);

        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(400).set_body_json(envelope(400, "invalid")))
            .mount(&mock_server)
            .await;

        let url = format!("{}/bad", mock_server.uri());
        let request = ApiRequest::get(url);
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            client.execute_with(&request, &slow_policy, &CancelSignal::never()),
        )
        .await
        .expect("a fatal error must not wait for the retry interval");

        assert!(matches!(result, Err(ApiError::Api { code: 400, .. })));
        assert_eq!(request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(envelope(404, "Project not found.")),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/gone", mock_server.uri());
        let err = client.execute(&ApiRequest::get(url)).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("resource-not-found"));
        assert_eq!(request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_malformed_error_body_is_not_retried() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/html", mock_server.uri());
        let err = client.execute(&ApiRequest::get(url)).await.unwrap_err();

        assert!(matches!(err, ApiError::MalformedEnvelope { http_status: 500, .. }));
        assert_eq!(request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried_and_surfaced() {
        // Nothing listens on this port once the server is dropped
        let uri = {
            let mock_server = MockServer::builder().start().await;
            mock_server.uri()
        };
        let client = DbtCloudClient::test_client(&uri);

        let err = client
            .execute(&ApiRequest::get(format!("{}/x", uri)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }

    #[tokio::test]
    async fn test_cancel_during_retry_delay() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());
        let slow_policy = RetryPolicy::new(10, Duration::from_secs(60), vec![500]);
        let (handle, signal) = CancelHandle::new();

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500).set_body_json(envelope(500, "boom")))
            .mount(&mock_server)
            .await;

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.cancel();
        });

        let request = ApiRequest::get(format!("{}/flaky", mock_server.uri()));
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            client.execute_with(&request, &slow_policy, &signal),
        )
        .await
        .expect("cancellation must interrupt the retry delay");

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_sends_nothing() {
        let mock_server = MockServer::start().await;
        let client = DbtCloudClient::test_client(&mock_server.uri());
        let (handle, signal) = CancelHandle::new();
        handle.cancel();

        let request = ApiRequest::get(format!("{}/x", mock_server.uri()));
        let policy = RetryPolicy::default();
        let result = client.execute_with(&request, &policy, &signal).await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(request_count(&mock_server).await, 0);
    }
}
