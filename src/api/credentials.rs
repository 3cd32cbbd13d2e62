//! Client configuration resolution from multiple sources

use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::settings::{ClientConfig, RetryPolicy};
use crate::config::{api, defaults, env};
use crate::error::{ApiError, Result};

/// Values given explicitly by the caller; each wins over every other source
#[derive(Debug, Clone, Default)]
pub struct ExplicitSettings {
    pub token: Option<String>,
    pub account_id: Option<i64>,
    pub host_url: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_interval: Option<Duration>,
    pub retryable_codes: Option<Vec<u16>>,
    pub timeout: Option<Duration>,
}

/// dbt Cloud CLI config file (`~/.dbt/dbt_cloud.yml`)
#[derive(Deserialize, Debug, Default)]
struct CliConfigFile {
    #[serde(default)]
    context: Option<CliContext>,
    #[serde(default)]
    projects: Vec<CliProject>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct CliContext {
    #[serde(default)]
    active_project: Option<serde_yml::Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct CliProject {
    #[serde(default)]
    project_id: Option<serde_yml::Value>,
    #[serde(default)]
    account_id: Option<serde_yml::Value>,
    #[serde(default)]
    account_host: Option<String>,
    #[serde(default)]
    token_value: Option<String>,
}

/// Settings found in the CLI config file
#[derive(Debug, Default, PartialEq, Eq)]
struct FileSettings {
    token: Option<String>,
    account_id: Option<i64>,
    host_url: Option<String>,
}

/// Ids may be written as numbers or quoted strings
fn yaml_to_string(value: &serde_yml::Value) -> Option<String> {
    match value {
        serde_yml::Value::String(s) => Some(s.clone()),
        serde_yml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Hosts in the CLI file are bare names, e.g. `cloud.getdbt.com`
fn host_to_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{}/api", host.trim_end_matches('/'))
    }
}

impl CliConfigFile {
    /// Settings of the active project, or of the first project when none is active
    fn active_settings(&self) -> FileSettings {
        let active = self
            .context
            .as_ref()
            .and_then(|c| c.active_project.as_ref())
            .and_then(yaml_to_string);

        let project = match active {
            Some(id) => self.projects.iter().find(|p| {
                p.project_id.as_ref().and_then(yaml_to_string).as_deref() == Some(id.as_str())
            }),
            None => self.projects.first(),
        };

        let Some(project) = project else {
            return FileSettings::default();
        };

        FileSettings {
            token: project.token_value.clone(),
            account_id: project
                .account_id
                .as_ref()
                .and_then(yaml_to_string)
                .and_then(|s| s.trim().parse().ok()),
            host_url: project.account_host.as_deref().map(host_to_url),
        }
    }
}

/// Resolves `ClientConfig` with fallback logic
///
/// Every setting is looked up in order:
/// 1. explicit value
/// 2. environment variable (`DBT_CLOUD_*`)
/// 3. dbt Cloud CLI config file (token, account id and host only)
/// 4. built-in default (host, retry policy and timeout only)
pub struct ConfigResolver {
    config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver reading the config file from `DBT_CLOUD_CONFIG` or `~/.dbt/dbt_cloud.yml`
    pub fn new() -> Self {
        let config_path = std::env::var(env::CONFIG_PATH)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|p| p.join(env::CONFIG_FILE)));
        Self { config_path }
    }

    /// Resolver reading the config file from an explicit path
    pub fn with_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Resolve against the process environment
    pub fn resolve(&self, explicit: &ExplicitSettings) -> Result<ClientConfig> {
        self.resolve_with(explicit, |name| std::env::var(name).ok())
    }

    /// Resolve against a custom environment lookup
    pub fn resolve_with<F>(
        &self,
        explicit: &ExplicitSettings,
        env_lookup: F,
    ) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            env_lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let file = self.read_config_file()?;

        let token = match explicit.token.clone() {
            Some(token) => {
                debug!("Using token from explicit settings");
                Some(token)
            }
            None => match lookup(env::TOKEN) {
                Some(token) => {
                    debug!("Using token from {} environment variable", env::TOKEN);
                    Some(token)
                }
                None => file.token.clone(),
            },
        };
        let token =
            token.ok_or_else(|| ApiError::Config(self.missing_message("API token", env::TOKEN)))?;

        let account_id = match explicit.account_id {
            Some(id) => Some(id),
            None => match lookup(env::ACCOUNT_ID) {
                Some(raw) => Some(parse_number::<i64>(env::ACCOUNT_ID, &raw)?),
                None => file.account_id,
            },
        };
        let account_id = account_id
            .ok_or_else(|| ApiError::Config(self.missing_message("account id", env::ACCOUNT_ID)))?;

        let host_url = explicit
            .host_url
            .clone()
            .or_else(|| lookup(env::HOST_URL))
            .or(file.host_url)
            .unwrap_or_else(|| api::DEFAULT_HOST_URL.to_string());
        debug!("Using dbt Cloud API at {} for account {}", host_url, account_id);

        let max_retries = match explicit.max_retries {
            Some(n) => n,
            None => match lookup(env::MAX_RETRIES) {
                Some(raw) => parse_number(env::MAX_RETRIES, &raw)?,
                None => defaults::MAX_ATTEMPTS,
            },
        };

        let retry_interval = match explicit.retry_interval {
            Some(d) => d,
            None => match lookup(env::RETRY_INTERVAL_SECONDS) {
                Some(raw) => {
                    Duration::from_secs(parse_number(env::RETRY_INTERVAL_SECONDS, &raw)?)
                }
                None => Duration::from_secs(defaults::RETRY_INTERVAL_SECS),
            },
        };

        let retryable_codes = match explicit.retryable_codes.clone() {
            Some(codes) => codes,
            None => match lookup(env::RETRIABLE_STATUS_CODES) {
                Some(raw) => parse_status_codes(&raw)?,
                None => defaults::RETRYABLE_CODES.to_vec(),
            },
        };

        let timeout = match explicit.timeout {
            Some(d) => d,
            None => match lookup(env::TIMEOUT_SECONDS) {
                Some(raw) => Duration::from_secs(parse_number(env::TIMEOUT_SECONDS, &raw)?),
                None => Duration::from_secs(defaults::TIMEOUT_SECS),
            },
        };

        Ok(ClientConfig::new(host_url, account_id, token)
            .with_timeout(timeout)
            .with_retry_policy(RetryPolicy::new(max_retries, retry_interval, retryable_codes)))
    }

    /// Read the CLI config file; a missing file yields no settings
    fn read_config_file(&self) -> Result<FileSettings> {
        let Some(path) = self.config_path.as_deref() else {
            return Ok(FileSettings::default());
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                debug!("No dbt Cloud config file at {}", path.display());
                return Ok(FileSettings::default());
            }
        };

        debug!("Reading dbt Cloud config file {}", path.display());
        let parsed: CliConfigFile = serde_yml::from_str(&content).map_err(|e| {
            ApiError::Config(format!(
                "Could not parse dbt Cloud config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(parsed.active_settings())
    }

    /// Generate helpful error message when a required setting is missing
    fn missing_message(&self, what: &str, env_var: &str) -> String {
        let file_info = self
            .config_path
            .as_deref()
            .map(|p: &Path| format!(" or in config file {}", p.display()))
            .unwrap_or_default();
        format!(
            "No {} found. Provide it explicitly, set {}{}",
            what, env_var, file_info
        )
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        ApiError::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            name, raw
        ))
    })
}

/// Parse a comma-separated list such as `429,500,502`
fn parse_status_codes(raw: &str) -> Result<Vec<u16>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number(env::RETRIABLE_STATUS_CODES, s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn resolver_without_file() -> ConfigResolver {
        ConfigResolver::with_config_path("/nonexistent/dbt_cloud.yml")
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_values_take_precedence() {
        let explicit = ExplicitSettings {
            token: Some("explicit-token".to_string()),
            account_id: Some(7),
            host_url: Some("https://emea.dbt.com/api".to_string()),
            ..Default::default()
        };
        let env = env_of(&[
            (env::TOKEN, "env-token"),
            (env::ACCOUNT_ID, "8"),
            (env::HOST_URL, "https://env.example/api"),
        ]);
        let config = resolver_without_file().resolve_with(&explicit, env).unwrap();
        assert_eq!(config.token(), "explicit-token");
        assert_eq!(config.account_id(), 7);
        assert_eq!(config.host_url(), "https://emea.dbt.com/api");
    }

    #[test]
    fn test_env_values_and_defaults() {
        let env = env_of(&[(env::TOKEN, "env-token"), (env::ACCOUNT_ID, " 8 ")]);
        let config = resolver_without_file()
            .resolve_with(&ExplicitSettings::default(), env)
            .unwrap();
        assert_eq!(config.token(), "env-token");
        assert_eq!(config.account_id(), 8);
        assert_eq!(config.host_url(), api::DEFAULT_HOST_URL);
        assert_eq!(config.retry_policy(), &RetryPolicy::default());
        assert_eq!(config.timeout(), Duration::from_secs(defaults::TIMEOUT_SECS));
    }

    #[test]
    fn test_retry_settings_from_env() {
        let env = env_of(&[
            (env::TOKEN, "t"),
            (env::ACCOUNT_ID, "1"),
            (env::MAX_RETRIES, "5"),
            (env::RETRY_INTERVAL_SECONDS, "2"),
            (env::RETRIABLE_STATUS_CODES, "429, 503"),
            (env::TIMEOUT_SECONDS, "60"),
        ]);
        let config = resolver_without_file()
            .resolve_with(&ExplicitSettings::default(), env)
            .unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.interval(), Duration::from_secs(2));
        assert_eq!(policy.retryable_codes().to_vec(), vec![429, 503]);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let env = env_of(&[(env::TOKEN, "t"), (env::ACCOUNT_ID, "abc")]);
        let err = resolver_without_file()
            .resolve_with(&ExplicitSettings::default(), env)
            .unwrap_err();
        match err {
            ApiError::Config(msg) => assert!(msg.contains(env::ACCOUNT_ID)),
            other => panic!("Expected ApiError::Config, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_token_lists_sources() {
        let err = resolver_without_file()
            .resolve_with(&ExplicitSettings::default(), no_env)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("API token"));
        assert!(msg.contains(env::TOKEN));
        assert!(msg.contains("/nonexistent/dbt_cloud.yml"));
    }

    #[test]
    fn test_config_file_active_project() {
        let file = write_config(
            r#"
version: "1"
context:
  active-project: "222"
projects:
  - project-id: "111"
    account-id: "1"
    account-host: "cloud.getdbt.com"
    token-value: "first-token"
  - project-id: 222
    account-id: 2
    account-host: "emea.dbt.com"
    token-value: "second-token"
"#,
        );
        let resolver = ConfigResolver::with_config_path(file.path());
        let config = resolver
            .resolve_with(&ExplicitSettings::default(), no_env)
            .unwrap();
        assert_eq!(config.token(), "second-token");
        assert_eq!(config.account_id(), 2);
        assert_eq!(config.host_url(), "https://emea.dbt.com/api");
    }

    #[test]
    fn test_config_file_first_project_without_context() {
        let file = write_config(
            r#"
projects:
  - project-id: "111"
    account-id: "1"
    account-host: "cloud.getdbt.com"
    token-value: "first-token"
"#,
        );
        let resolver = ConfigResolver::with_config_path(file.path());
        let env = env_of(&[(env::TOKEN, "env-token")]);
        let config = resolver
            .resolve_with(&ExplicitSettings::default(), env)
            .unwrap();
        assert_eq!(config.token(), "env-token");
        assert_eq!(config.account_id(), 1);
        assert_eq!(config.host_url(), "https://cloud.getdbt.com/api");
    }

    #[test]
    fn test_config_file_invalid_yaml() {
        let file = write_config("projects: [unclosed");
        let resolver = ConfigResolver::with_config_path(file.path());
        let err = resolver
            .resolve_with(&ExplicitSettings::default(), no_env)
            .unwrap_err();
        assert!(err.to_string().contains("Could not parse"));
    }

    #[test]
    fn test_host_to_url() {
        assert_eq!(host_to_url("cloud.getdbt.com"), "https://cloud.getdbt.com/api");
        assert_eq!(host_to_url("https://x.dbt.com/api/"), "https://x.dbt.com/api");
    }

    #[test]
    fn test_parse_status_codes() {
        assert_eq!(parse_status_codes("429,500, 502").unwrap(), vec![429, 500, 502]);
        assert!(parse_status_codes("429,abc").is_err());
    }
}
