use std::fmt;

use crate::api::ValidationError;
use crate::config::api::NOT_FOUND_SENTINEL;

/// Custom error type for dbt Cloud API operations
#[derive(Debug)]
pub enum ApiError {
    /// HTTP request failed before a response arrived (DNS, connect, timeout)
    Http(reqwest::Error),
    /// Non-2xx response as returned by the transport, not yet classified
    Status { status: u16, body: String },
    /// API reported a logical failure in its status envelope
    Api {
        http_status: u16,
        code: i64,
        user_message: String,
        developer_message: String,
    },
    /// API reported the resource does not exist
    NotFound {
        code: i64,
        user_message: String,
        developer_message: String,
        /// The message suggests a permission restriction rather than a deletion
        permission_hint: bool,
    },
    /// Response body is not a valid envelope
    MalformedEnvelope {
        http_status: u16,
        reason: String,
        body: String,
    },
    /// Response decoded but lacks an identity field
    Validation(ValidationError),
    /// JSON encoding or decoding error
    Json(String),
    /// Configuration error
    Config(String),
    /// Operation aborted through its cancel signal
    Cancelled,
}

impl ApiError {
    /// True for both not-found variants
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// True when a not-found is likely caused by the token's permissions
    pub fn is_permission_hint(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound {
                permission_hint: true,
                ..
            }
        )
    }

    /// Status code of the failure, when one is known
    pub fn status_code(&self) -> Option<i64> {
        match self {
            ApiError::Status { status, .. } => Some(i64::from(*status)),
            ApiError::Api { code, .. } | ApiError::NotFound { code, .. } => Some(*code),
            ApiError::MalformedEnvelope { http_status, .. } => Some(i64::from(*http_status)),
            ApiError::Http(e) => e.status().map(|s| i64::from(s.as_u16())),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP request failed: {}", e),
            ApiError::Status { status, body } => {
                write!(f, "unexpected HTTP status {}: {}", status, body)
            }
            ApiError::Api {
                http_status,
                code,
                user_message,
                developer_message,
            } => write!(
                f,
                "API error (HTTP {}, status code {}): {} (developer message: {})",
                http_status, code, user_message, developer_message
            ),
            ApiError::NotFound {
                code,
                user_message,
                developer_message,
                permission_hint,
            } => {
                write!(
                    f,
                    "{}: status code {}: {} (developer message: {})",
                    NOT_FOUND_SENTINEL, code, user_message, developer_message
                )?;
                if *permission_hint {
                    write!(
                        f,
                        "; the resource may exist but the API token lacks permission to read it"
                    )?;
                }
                Ok(())
            }
            ApiError::MalformedEnvelope {
                http_status,
                reason,
                body,
            } => write!(
                f,
                "malformed API response (HTTP {}): {}; body: {}",
                http_status, reason, body
            ),
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Json(msg) => write!(f, "JSON error: {}", msg),
            ApiError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ApiError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Json(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

/// Result type alias for dbt Cloud API operations
pub type Result<T> = std::result::Result<T, ApiError>;
