use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// The only configuration version understood so far.
pub const CONFIG_VERSION: &str = "1.0.0";

/// Environment variables with this prefix override file values,
/// e.g. `AUTHSESSION_API__BASE_URL`.
pub const ENV_PREFIX: &str = "AUTHSESSION_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: remote API, token storage and logging.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the authentication API lives.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_in_ms: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Layers the configuration sources: built-in version tag, then the YAML
/// file (a missing file is fine), then `AUTHSESSION_*` environment variables.
pub fn config_figment(path: &Path) -> Figment {
    Figment::from(Serialized::default("version", CONFIG_VERSION))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a `ConfigV1` from any figment, migrating older versions if needed.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the given YAML file plus environment overrides.
pub fn load_config(path: &Path) -> Result<ConfigV1, figment::Error> {
    extract_config(&config_figment(path))
}

/// The JSON schema for the configuration file.
pub fn config_schema() -> String {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
