//! Environment data models

use serde::{Deserialize, Serialize};

use crate::api::projects::STATE_ACTIVE;
use crate::api::traits::ApiResource;

fn default_state() -> i64 {
    STATE_ACTIVE
}

/// Whether an environment runs jobs or backs the IDE
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Deployment,
    Development,
}

/// Environment as returned by the v3 API
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub account_id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: EnvironmentType,
    #[serde(default)]
    pub dbt_version: Option<String>,
    #[serde(default)]
    pub use_custom_branch: bool,
    #[serde(default)]
    pub custom_branch: Option<String>,
    #[serde(default)]
    pub credentials_id: Option<i64>,
    /// "production", "staging" or unset for general deployment environments
    #[serde(default)]
    pub deployment_type: Option<String>,
    #[serde(default = "default_state")]
    pub state: i64,
}

impl ApiResource for Environment {
    const RESOURCE_TYPE: &'static str = "environment";

    fn identity(&self) -> Option<i64> {
        self.id
    }
}

/// Payload for creating an environment
#[derive(Serialize, Debug, Clone)]
pub struct NewEnvironment {
    pub account_id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: EnvironmentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbt_version: Option<String>,
    pub use_custom_branch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<String>,
    pub state: i64,
}

impl NewEnvironment {
    pub fn new(
        account_id: i64,
        project_id: i64,
        name: &str,
        environment_type: EnvironmentType,
    ) -> Self {
        Self {
            account_id,
            project_id,
            name: name.to_string(),
            environment_type,
            dbt_version: None,
            use_custom_branch: false,
            custom_branch: None,
            deployment_type: None,
            state: STATE_ACTIVE,
        }
    }

    pub fn with_dbt_version(mut self, version: &str) -> Self {
        self.dbt_version = Some(version.to_string());
        self
    }

    pub fn with_custom_branch(mut self, branch: &str) -> Self {
        self.use_custom_branch = true;
        self.custom_branch = Some(branch.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_type_wire_names() {
        assert_eq!(
            serde_json::to_value(EnvironmentType::Deployment).unwrap(),
            "deployment"
        );
        let parsed: EnvironmentType = serde_json::from_value(serde_json::json!("development")).unwrap();
        assert_eq!(parsed, EnvironmentType::Development);
    }

    #[test]
    fn test_environment_deserialize() {
        let env: Environment = serde_json::from_value(serde_json::json!({
            "id": 0,
            "account_id": 1,
            "project_id": 2,
            "name": "Prod",
            "type": "deployment",
            "dbt_version": "versionless",
            "deployment_type": "production"
        }))
        .unwrap();
        assert_eq!(env.identity(), Some(0));
        assert_eq!(env.environment_type, EnvironmentType::Deployment);
        assert!(!env.use_custom_branch);
        assert_eq!(env.state, 1);
    }

    #[test]
    fn test_new_environment_with_branch() {
        let payload = NewEnvironment::new(1, 2, "CI", EnvironmentType::Deployment)
            .with_custom_branch("release")
            .with_dbt_version("1.8.0-latest");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "deployment");
        assert_eq!(json["use_custom_branch"], true);
        assert_eq!(json["custom_branch"], "release");
        assert!(json.get("deployment_type").is_none());
    }
}
