//! Environment API operations

use log::debug;

use crate::api::client::{ApiVersion, DbtCloudClient};
use crate::api::resources::absent_if_not_found;
use crate::config::api;
use crate::error::Result;

use super::models::{Environment, NewEnvironment};

impl DbtCloudClient {
    fn environments_url(&self, project_id: i64) -> String {
        self.account_url(
            ApiVersion::V3,
            &format!("{}/{}/{}/", api::PROJECTS, project_id, api::ENVIRONMENTS),
        )
    }

    fn environment_url(&self, project_id: i64, environment_id: i64) -> String {
        format!("{}{}/", self.environments_url(project_id), environment_id)
    }

    /// Get all environments of a project (with pagination)
    pub async fn get_environments(&self, project_id: i64) -> Result<Vec<Environment>> {
        debug!("Listing environments for project {}", project_id);
        self.list_resources(&self.environments_url(project_id))
            .await
    }

    /// Get a single environment
    pub async fn get_environment(
        &self,
        project_id: i64,
        environment_id: i64,
    ) -> Result<Environment> {
        self.read_resource(&self.environment_url(project_id, environment_id))
            .await
    }

    /// Get an environment, or `None` when it is known to be gone
    pub async fn find_environment(
        &self,
        project_id: i64,
        environment_id: i64,
    ) -> Result<Option<Environment>> {
        absent_if_not_found(self.get_environment(project_id, environment_id).await)
    }

    /// Create an environment in the payload's project
    pub async fn create_environment(&self, environment: &NewEnvironment) -> Result<Environment> {
        let url = self.environments_url(environment.project_id);
        self.create_resource(&url, environment).await
    }

    /// Replace an environment's settings
    pub async fn update_environment(
        &self,
        project_id: i64,
        environment_id: i64,
        environment: &Environment,
    ) -> Result<Environment> {
        self.update_resource(&self.environment_url(project_id, environment_id), environment)
            .await
    }

    /// Delete an environment
    pub async fn delete_environment(&self, project_id: i64, environment_id: i64) -> Result<()> {
        self.delete_resource(&self.environment_url(project_id, environment_id))
            .await
    }
}
