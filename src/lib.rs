//! dbtcloud-api - resilient access to the dbt Cloud REST API
//!
//! The shared layer under infrastructure-as-code resource wrappers for
//! dbt Cloud: authenticated HTTP calls with timeouts and bounded retries,
//! offset pagination, failure classification and response validation.
//!
//! # Features
//!
//! - Bounded retries on a configurable set of status codes
//! - Offset pagination that terminates on inconsistent server counts
//! - `resource-not-found` errors that flag permission-scoped 404s
//! - Identity checks on successful responses, with the full response attached
//! - Cancellation of long retry or pagination sequences
//!
//! # Example
//!
//! ```no_run
//! use dbtcloud_api::{ConfigResolver, DbtCloudClient, ExplicitSettings};
//!
//! # async fn run() -> dbtcloud_api::Result<()> {
//! let config = ConfigResolver::new().resolve(&ExplicitSettings::default())?;
//! let client = DbtCloudClient::new(config);
//!
//! for project in client.get_projects(None).await? {
//!     println!("{:?} {}", project.id, project.name);
//! }
//!
//! match client.get_project(42).await {
//!     Ok(project) => println!("found {}", project.name),
//!     Err(e) if e.is_not_found() && !e.is_permission_hint() => println!("gone"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;

pub use api::{
    ApiRequest, ApiResource, ApiVersion, CancelHandle, CancelSignal, ClientConfig, ConfigResolver,
    DbtCloudClient, ErrorClass, ExplicitSettings, RetryPolicy, ValidationError,
};
pub use api::{Environment, GlobalConnection, Project};
pub use error::{ApiError, Result};
