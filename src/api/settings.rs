//! Immutable client configuration

use std::time::Duration;

use crate::config::{api, defaults};

/// Bounded retry policy applied to every logical operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
    retryable_codes: Vec<u16>,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is floored at 1 so every operation runs once
    pub fn new(max_attempts: u32, interval: Duration, retryable_codes: Vec<u16>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            retryable_codes,
        }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Vec::new())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn retryable_codes(&self) -> &[u16] {
        &self.retryable_codes
    }

    /// Whether a status code is in the retryable set
    pub fn is_retryable(&self, code: i64) -> bool {
        self.retryable_codes
            .iter()
            .any(|&c| i64::from(c) == code)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            defaults::MAX_ATTEMPTS,
            Duration::from_secs(defaults::RETRY_INTERVAL_SECS),
            defaults::RETRYABLE_CODES.to_vec(),
        )
    }
}

/// Everything a client needs to reach one dbt Cloud account
///
/// Built once and shared read-only by every call made through the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host_url: String,
    account_id: i64,
    token: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a configuration with default timeout and retry policy
    ///
    /// `host_url` is the API root without version, e.g. `https://cloud.getdbt.com/api`.
    pub fn new(host_url: impl Into<String>, account_id: i64, token: impl Into<String>) -> Self {
        let host_url = host_url.into().trim_end_matches('/').to_string();
        Self {
            host_url,
            account_id,
            token: token.into(),
            timeout: Duration::from_secs(defaults::TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    /// Configuration against the public multi-tenant host
    pub fn for_default_host(account_id: i64, token: impl Into<String>) -> Self {
        Self::new(api::DEFAULT_HOST_URL, account_id, token)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}
