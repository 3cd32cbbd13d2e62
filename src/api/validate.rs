//! Response shape validation
//!
//! A permission-scoped token can get HTTP 200 with a resource whose identity
//! is missing. Decoding succeeds in that case, so callers check the identity
//! field explicitly and report the whole response when it is absent.

use std::fmt;

/// A successful response lacked a field the resource cannot exist without
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    resource_type: String,
    field: String,
    response: String,
}

impl ValidationError {
    /// Build from a decoded response, kept pretty-printed
    pub fn new(resource_type: &str, field: &str, response: &serde_json::Value) -> Self {
        let response =
            serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string());
        Self {
            resource_type: resource_type.to_string(),
            field: field.to_string(),
            response,
        }
    }

    /// Build from a raw body that may not even be JSON
    pub fn from_body(resource_type: &str, field: &str, body: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => Self::new(resource_type, field, &value),
            Err(_) => Self {
                resource_type: resource_type.to_string(),
                field: field.to_string(),
                response: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Full API response as received
    pub fn response(&self) -> &str {
        &self.response
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the API returned a {} without its `{}` field. The request succeeded, so this \
             usually means the API token lacks permission to read this {} or the API \
             returned an incomplete object.\nFull API response:\n{}",
            self.resource_type, self.field, self.resource_type, self.response
        )
    }
}

impl std::error::Error for ValidationError {}

/// Reject a response whose identity field did not come back
///
/// Only presence is checked: any value, including `0`, is a valid identity.
pub fn validate_identity<I>(
    id: Option<&I>,
    resource_type: &str,
    field: &str,
    response: &serde_json::Value,
) -> Result<(), ValidationError> {
    match id {
        Some(_) => Ok(()),
        None => Err(ValidationError::new(resource_type, field, response)),
    }
}
