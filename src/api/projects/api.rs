//! Project API operations

use log::debug;

use crate::api::client::{ApiVersion, DbtCloudClient};
use crate::api::resources::absent_if_not_found;
use crate::config::api;
use crate::error::Result;

use super::models::{NewProject, Project};

impl DbtCloudClient {
    fn project_url(&self, project_id: i64) -> String {
        self.account_url(
            ApiVersion::V3,
            &format!("{}/{}/", api::PROJECTS, project_id),
        )
    }

    /// Get all projects in the account (with pagination and optional name filter)
    ///
    /// `name_contains` is matched server-side, case-insensitively.
    pub async fn get_projects(&self, name_contains: Option<&str>) -> Result<Vec<Project>> {
        let mut url = self.account_url(ApiVersion::V3, &format!("{}/", api::PROJECTS));
        if let Some(name) = name_contains {
            url.push_str(&format!("?name__icontains={}", urlencoding::encode(name)));
        }
        debug!("Listing projects (name filter: {:?})", name_contains);

        self.list_resources(&url).await
    }

    /// Get a single project by ID
    pub async fn get_project(&self, project_id: i64) -> Result<Project> {
        self.read_resource(&self.project_url(project_id)).await
    }

    /// Get a project, or `None` when it is known to be gone
    pub async fn find_project(&self, project_id: i64) -> Result<Option<Project>> {
        absent_if_not_found(self.get_project(project_id).await)
    }

    /// Create a project
    pub async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let url = self.account_url(ApiVersion::V3, &format!("{}/", api::PROJECTS));
        let created: Project = self.create_resource(&url, project).await?;
        debug!("Created project '{}' (ID: {:?})", created.name, created.id);
        Ok(created)
    }

    /// Replace a project's settings
    pub async fn update_project(&self, project_id: i64, project: &Project) -> Result<Project> {
        self.update_resource(&self.project_url(project_id), project)
            .await
    }

    /// Delete a project
    pub async fn delete_project(&self, project_id: i64) -> Result<()> {
        self.delete_resource(&self.project_url(project_id)).await
    }
}
