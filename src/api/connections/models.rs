//! Global connection data models
//!
//! Every connection shares a common header; its `config` object depends on
//! the `adapter_version` discriminator and is decoded into the matching
//! variant of `ConnectionConfig`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::api::traits::ApiResource;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SnowflakeConfig {
    pub account: String,
    pub database: String,
    pub warehouse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub client_session_keep_alive: bool,
    #[serde(default)]
    pub allow_sso: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BigQueryConfig {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Shared by Postgres and Redshift
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub hostname: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DatabricksConfig {
    pub host: String,
    pub http_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
}

/// Adapter-specific connection settings
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionConfig {
    Snowflake(SnowflakeConfig),
    /// Legacy BigQuery adapter
    BigQueryV0(BigQueryConfig),
    BigQueryV1(BigQueryConfig),
    Postgres(PostgresConfig),
    Redshift(PostgresConfig),
    Databricks(DatabricksConfig),
    /// Adapter this crate has no typed model for; config kept verbatim
    Other {
        adapter_version: String,
        config: serde_json::Value,
    },
}

impl ConnectionConfig {
    /// Wire discriminator for this variant
    pub fn adapter_version(&self) -> &str {
        match self {
            ConnectionConfig::Snowflake(_) => "snowflake_v0",
            ConnectionConfig::BigQueryV0(_) => "bigquery_v0",
            ConnectionConfig::BigQueryV1(_) => "bigquery_v1",
            ConnectionConfig::Postgres(_) => "postgres_v0",
            ConnectionConfig::Redshift(_) => "redshift_v0",
            ConnectionConfig::Databricks(_) => "databricks_v0",
            ConnectionConfig::Other {
                adapter_version, ..
            } => adapter_version.as_str(),
        }
    }

    /// Decode `config` according to its discriminator
    pub fn decode(
        adapter_version: &str,
        config: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match adapter_version {
            "snowflake_v0" => ConnectionConfig::Snowflake(serde_json::from_value(config)?),
            "bigquery_v0" => ConnectionConfig::BigQueryV0(serde_json::from_value(config)?),
            "bigquery_v1" => ConnectionConfig::BigQueryV1(serde_json::from_value(config)?),
            "postgres_v0" => ConnectionConfig::Postgres(serde_json::from_value(config)?),
            "redshift_v0" => ConnectionConfig::Redshift(serde_json::from_value(config)?),
            "databricks_v0" => ConnectionConfig::Databricks(serde_json::from_value(config)?),
            other => ConnectionConfig::Other {
                adapter_version: other.to_string(),
                config,
            },
        })
    }
}

impl Serialize for ConnectionConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConnectionConfig::Snowflake(c) => c.serialize(serializer),
            ConnectionConfig::BigQueryV0(c) | ConnectionConfig::BigQueryV1(c) => {
                c.serialize(serializer)
            }
            ConnectionConfig::Postgres(c) | ConnectionConfig::Redshift(c) => {
                c.serialize(serializer)
            }
            ConnectionConfig::Databricks(c) => c.serialize(serializer),
            ConnectionConfig::Other { config, .. } => config.serialize(serializer),
        }
    }
}

/// Global (account-level) warehouse connection
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConnection {
    pub id: Option<i64>,
    pub account_id: i64,
    pub name: String,
    pub is_ssh_tunnel_enabled: bool,
    pub config: ConnectionConfig,
}

impl GlobalConnection {
    pub fn new(account_id: i64, name: &str, config: ConnectionConfig) -> Self {
        Self {
            id: None,
            account_id,
            name: name.to_string(),
            is_ssh_tunnel_enabled: false,
            config,
        }
    }
}

#[derive(Deserialize)]
struct WireConnection {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    account_id: i64,
    name: String,
    adapter_version: String,
    #[serde(default)]
    is_ssh_tunnel_enabled: bool,
    #[serde(default)]
    config: serde_json::Value,
}

#[derive(Serialize)]
struct WireConnectionRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    account_id: i64,
    name: &'a str,
    adapter_version: &'a str,
    is_ssh_tunnel_enabled: bool,
    config: &'a ConnectionConfig,
}

impl<'de> Deserialize<'de> for GlobalConnection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireConnection::deserialize(deserializer)?;
        let config = ConnectionConfig::decode(&wire.adapter_version, wire.config).map_err(|e| {
            D::Error::custom(format!(
                "invalid config for adapter '{}': {}",
                wire.adapter_version, e
            ))
        })?;
        Ok(Self {
            id: wire.id,
            account_id: wire.account_id,
            name: wire.name,
            is_ssh_tunnel_enabled: wire.is_ssh_tunnel_enabled,
            config,
        })
    }
}

impl Serialize for GlobalConnection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireConnectionRef {
            id: self.id,
            account_id: self.account_id,
            name: &self.name,
            adapter_version: self.config.adapter_version(),
            is_ssh_tunnel_enabled: self.is_ssh_tunnel_enabled,
            config: &self.config,
        }
        .serialize(serializer)
    }
}

impl ApiResource for GlobalConnection {
    const RESOURCE_TYPE: &'static str = "global connection";

    fn identity(&self) -> Option<i64> {
        self.id
    }
}
