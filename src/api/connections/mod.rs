//! Global connection module

mod api;
mod models;

pub use models::{
    BigQueryConfig, ConnectionConfig, DatabricksConfig, GlobalConnection, PostgresConfig,
    SnowflakeConfig,
};
