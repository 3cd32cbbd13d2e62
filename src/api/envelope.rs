//! JSON envelope shared by every dbt Cloud API response
//!
//! ```json
//! {
//!   "data": ...,
//!   "status": {"code": 200, "is_success": true, "user_message": "", "developer_message": ""},
//!   "extra": {"pagination": {"count": 100, "total_count": 201}}
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Full response envelope; `data` stays raw JSON until a caller decodes it
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Envelope<T = serde_json::Value> {
    pub data: T,
    #[serde(default)]
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub extra: Option<Extra>,
}

/// The `status` object; `code` is authoritative even under HTTP 200
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeStatus {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub is_success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub developer_message: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Extra {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination counters, present only on list endpoints
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Items in this page
    pub count: u64,
    /// Items across all pages
    pub total_count: u64,
}

impl<T> Envelope<T> {
    pub fn pagination(&self) -> Option<Pagination> {
        self.extra.as_ref().and_then(|e| e.pagination)
    }
}

/// Only the `status` sub-object, tolerant of any `data` shape
#[derive(Deserialize, Debug)]
struct StatusOnly {
    status: EnvelopeStatus,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode just the `status` object of a response body
pub fn decode_status(body: &[u8]) -> std::result::Result<EnvelopeStatus, serde_json::Error> {
    serde_json::from_slice::<StatusOnly>(body).map(|s| s.status)
}

/// Whether a body carries an envelope whose `status.code` is a failure
///
/// Bodies without an envelope, or without a code, report nothing.
pub fn status_reports_failure(body: &[u8]) -> bool {
    decode_status(body)
        .map(|status| status.code >= 400)
        .unwrap_or(false)
}

/// Decode a body into an envelope with untyped `data`
pub fn decode_envelope(body: &[u8], http_status: u16) -> Result<Envelope> {
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedEnvelope {
        http_status,
        reason: e.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Decode the `data` member of a successful response into `T`
///
/// Returns the typed value and the full response as JSON for diagnostics.
pub fn decode_data<T>(body: &[u8]) -> Result<(T, serde_json::Value)>
where
    T: DeserializeOwned,
{
    let raw: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedEnvelope {
            http_status: 200,
            reason: e.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        })?;
    let data = raw.get("data").cloned().unwrap_or(serde_json::Value::Null);
    let item: T = serde_json::from_value(data)
        .map_err(|e| ApiError::Json(format!("failed to decode response data: {}", e)))?;
    Ok((item, raw))
}
