//! Global connection API operations

use crate::api::client::{ApiVersion, DbtCloudClient};
use crate::api::resources::absent_if_not_found;
use crate::config::api;
use crate::error::Result;

use super::models::GlobalConnection;

impl DbtCloudClient {
    fn connection_url(&self, connection_id: i64) -> String {
        self.account_url(
            ApiVersion::V3,
            &format!("{}/{}/", api::CONNECTIONS, connection_id),
        )
    }

    /// Get all global connections in the account (with pagination)
    pub async fn get_connections(&self) -> Result<Vec<GlobalConnection>> {
        let url = self.account_url(ApiVersion::V3, &format!("{}/", api::CONNECTIONS));
        self.list_resources(&url).await
    }

    pub async fn get_connection(&self, connection_id: i64) -> Result<GlobalConnection> {
        self.read_resource(&self.connection_url(connection_id))
            .await
    }

    pub async fn find_connection(&self, connection_id: i64) -> Result<Option<GlobalConnection>> {
        absent_if_not_found(self.get_connection(connection_id).await)
    }

    pub async fn create_connection(&self, connection: &GlobalConnection) -> Result<GlobalConnection> {
        let url = self.account_url(ApiVersion::V3, &format!("{}/", api::CONNECTIONS));
        self.create_resource(&url, connection).await
    }

    /// Update a connection in place
    pub async fn update_connection(
        &self,
        connection_id: i64,
        connection: &GlobalConnection,
    ) -> Result<GlobalConnection> {
        self.patch_resource(&self.connection_url(connection_id), connection)
            .await
    }

    pub async fn delete_connection(&self, connection_id: i64) -> Result<()> {
        self.delete_resource(&self.connection_url(connection_id))
            .await
    }
}
