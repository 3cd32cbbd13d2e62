//! Failure classification
//!
//! Decides whether a failed call is worth retrying, means "does not exist",
//! or is final. The API has no structured permission error, so a 404 whose
//! user message talks about permissions is reported as a distinct class.

use crate::api::envelope::decode_status;
use crate::error::ApiError;

/// Outcome of classifying one failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Safe to retry
    Transient,
    /// Resource does not exist
    NotFound,
    /// 404 whose message points at missing permissions
    NotFoundPermission,
    /// Give up immediately
    Fatal,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        self == ErrorClass::Transient
    }
}

const PERMISSION_MARKERS: &[&str] = &["permission", "proper permissions"];

/// Whether a user-facing message hints at a permission restriction
pub fn mentions_permission(user_message: &str) -> bool {
    let lowered = user_message.to_lowercase();
    PERMISSION_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Classify an envelope status code and its user message
///
/// 404 wins over the retryable set.
pub fn classify_status(code: i64, user_message: &str, retryable_codes: &[u16]) -> ErrorClass {
    if code == 404 {
        if mentions_permission(user_message) {
            return ErrorClass::NotFoundPermission;
        }
        return ErrorClass::NotFound;
    }
    if retryable_codes.iter().any(|&c| i64::from(c) == code) {
        return ErrorClass::Transient;
    }
    ErrorClass::Fatal
}

/// Classify a failed call and turn it into the error its caller should see
///
/// Transport failures are transient. A raw non-2xx response is read through
/// its envelope `status`; a body that is not an envelope is fatal.
pub fn classify(err: ApiError, retryable_codes: &[u16]) -> (ErrorClass, ApiError) {
    match err {
        ApiError::Http(e) => {
            if e.is_builder() || e.is_decode() {
                (ErrorClass::Fatal, ApiError::Http(e))
            } else {
                (ErrorClass::Transient, ApiError::Http(e))
            }
        }
        ApiError::Status { status, body } => {
            let parsed = match decode_status(body.as_bytes()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    return (
                        ErrorClass::Fatal,
                        ApiError::MalformedEnvelope {
                            http_status: status,
                            reason: format!("could not decode error envelope: {}", e),
                            body,
                        },
                    )
                }
            };

            let class = classify_status(parsed.code, &parsed.user_message, retryable_codes);
            let err = match class {
                ErrorClass::NotFound | ErrorClass::NotFoundPermission => ApiError::NotFound {
                    code: parsed.code,
                    user_message: parsed.user_message,
                    developer_message: parsed.developer_message,
                    permission_hint: class == ErrorClass::NotFoundPermission,
                },
                ErrorClass::Transient | ErrorClass::Fatal => ApiError::Api {
                    http_status: status,
                    code: parsed.code,
                    user_message: parsed.user_message,
                    developer_message: parsed.developer_message,
                },
            };
            (class, err)
        }
        other => (ErrorClass::Fatal, other),
    }
}
