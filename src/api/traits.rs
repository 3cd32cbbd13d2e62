//! Common traits for dbt Cloud resources

use serde::de::DeserializeOwned;

use crate::api::validate::{validate_identity, ValidationError};

/// A dbt Cloud object addressed by a numeric identity
///
/// Identity is optional on the wire: a token with narrow permissions can
/// receive an object without it. Implementors only say where the identity
/// lives; checking it is the same for every resource type.
pub trait ApiResource: DeserializeOwned {
    /// Human-readable type name used in diagnostics, e.g. "project"
    const RESOURCE_TYPE: &'static str;

    /// Wire name of the identity field
    const ID_FIELD: &'static str = "id";

    /// The identity, if the API returned one
    fn identity(&self) -> Option<i64>;

    /// Reject this object when its identity is missing
    fn check_identity(&self, response: &serde_json::Value) -> Result<(), ValidationError> {
        validate_identity(
            self.identity().as_ref(),
            Self::RESOURCE_TYPE,
            Self::ID_FIELD,
            response,
        )
    }
}
