//! Project data models

use serde::{Deserialize, Serialize};

use crate::api::traits::ApiResource;

/// Object state: active
pub const STATE_ACTIVE: i64 = 1;

fn default_state() -> i64 {
    STATE_ACTIVE
}

/// Project as returned by the v3 API
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub account_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_project_subdirectory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<i64>,
    #[serde(default = "default_state")]
    pub state: i64,
}

impl ApiResource for Project {
    const RESOURCE_TYPE: &'static str = "project";

    fn identity(&self) -> Option<i64> {
        self.id
    }
}

impl Project {
    /// Get the project description
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        self.state == STATE_ACTIVE
    }
}

/// Payload for creating a project
#[derive(Serialize, Debug, Clone)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbt_project_subdirectory: Option<String>,
}

impl NewProject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            dbt_project_subdirectory: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}
