/// Configuration constants for the dbt Cloud API
pub mod api {
    /// Default API root (without version segment)
    pub const DEFAULT_HOST_URL: &str = "https://cloud.getdbt.com/api";

    /// Accounts path segment
    pub const ACCOUNTS: &str = "accounts";

    /// Projects endpoint
    pub const PROJECTS: &str = "projects";

    /// Environments endpoint (nested under a project)
    pub const ENVIRONMENTS: &str = "environments";

    /// Global connections endpoint
    pub const CONNECTIONS: &str = "connections";

    /// Query parameter used for offset pagination
    pub const OFFSET_PARAM: &str = "offset";

    /// Sentinel prefix carried by every "does not exist" error
    pub const NOT_FOUND_SENTINEL: &str = "resource-not-found";

    /// Content type for every request and response
    pub const CONTENT_TYPE: &str = "application/json";
}

/// Default retry and timeout values
pub mod defaults {
    /// Maximum attempts per operation
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Delay between attempts, in seconds
    pub const RETRY_INTERVAL_SECS: u64 = 10;

    /// Status codes retried by default
    pub const RETRYABLE_CODES: &[u16] = &[429, 500, 502, 503, 504];

    /// Per-call HTTP timeout, in seconds
    pub const TIMEOUT_SECS: u64 = 30;

    /// Connect timeout, in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Environment variables and files consulted by `ConfigResolver`
pub mod env {
    pub const TOKEN: &str = "DBT_CLOUD_TOKEN";
    pub const ACCOUNT_ID: &str = "DBT_CLOUD_ACCOUNT_ID";
    pub const HOST_URL: &str = "DBT_CLOUD_HOST_URL";
    pub const MAX_RETRIES: &str = "DBT_CLOUD_MAX_RETRIES";
    pub const RETRY_INTERVAL_SECONDS: &str = "DBT_CLOUD_RETRY_INTERVAL_SECONDS";
    pub const RETRIABLE_STATUS_CODES: &str = "DBT_CLOUD_RETRIABLE_STATUS_CODES";
    pub const TIMEOUT_SECONDS: &str = "DBT_CLOUD_TIMEOUT_SECONDS";

    /// Overrides the location of the CLI config file
    pub const CONFIG_PATH: &str = "DBT_CLOUD_CONFIG";

    /// dbt Cloud CLI config file (relative to HOME)
    pub const CONFIG_FILE: &str = ".dbt/dbt_cloud.yml";
}
