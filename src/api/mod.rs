//! dbt Cloud API access layer
//!
//! Every resource operation flows through the same path: the retry executor
//! sends the request, failures are classified from the status envelope,
//! list endpoints are accumulated page by page and single objects have
//! their identity checked before they reach the caller.

pub mod cancel;
pub mod classify;
mod client;
pub mod connections;
mod credentials;
pub mod envelope;
pub mod environments;
mod pagination;
pub mod projects;
mod resources;
mod retry;
mod settings;
pub mod traits;
mod validate;

pub use cancel::{CancelHandle, CancelSignal};
pub use classify::{classify, classify_status, mentions_permission, ErrorClass};
pub use client::{ApiRequest, ApiVersion, DbtCloudClient};
pub use connections::{ConnectionConfig, GlobalConnection};
pub use credentials::{ConfigResolver, ExplicitSettings};
pub use envelope::{
    decode_data, decode_envelope, decode_status, Envelope, EnvelopeStatus, Pagination,
};
pub use environments::{Environment, EnvironmentType, NewEnvironment};
pub use pagination::with_offset;
pub use projects::{NewProject, Project};
pub use resources::{absent_if_not_found, decode_resource};
pub use settings::{ClientConfig, RetryPolicy};
pub use traits::ApiResource;
pub use validate::{validate_identity, ValidationError};
