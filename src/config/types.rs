use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// Version tag assumed when neither the file nor the environment names one.
pub const CURRENT_VERSION: &str = "1.0.0";

/// Optional YAML file merged under the environment.
pub const CONFIG_PATH: &str = "./config.yaml";

/// Prefix of the environment variables that override the file, e.g. `ASCENT_API_URL`.
pub const ENV_PREFIX: &str = "ASCENT_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0. Resolved once at startup and immutable afterwards.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
#[serde(default)]
pub struct ConfigV1 {
    /// Explicit backend base URL. Wins over everything else when set.
    pub api_url: Option<String>,
    /// Origin the client is served from, e.g. `https://app.example.com`.
    /// Absent means a local development host.
    pub page_origin: Option<String>,
    /// OAuth client id for Google sign-in. Absent or empty disables the feature.
    pub google_client_id: Option<String>,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// The layered figment: defaults, then `./config.yaml`, then `ASCENT_*` variables.
pub fn figment() -> Figment {
    Figment::new()
        .merge(Serialized::default("version", CURRENT_VERSION))
        .merge(Yaml::file(CONFIG_PATH))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load config from the default layers.
pub fn load_config() -> Result<ConfigV1, ConfigError> {
    load_config_from(figment())
}

/// Extract a config from an arbitrary figment (tests feed YAML strings here).
pub fn load_config_from(figment: Figment) -> Result<ConfigV1, ConfigError> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
