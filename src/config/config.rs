use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: remote API, local storage, routes, UI defaults and logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn into_latest(self) -> ConfigV1 {
        // handle configuration migration between versions here when necessary
        match self {
            Config::ConfigV1(c) => c,
        }
    }
}

/// Load config from a YAML file, letting `GIFTSYNC_*` environment variables override it.
/// Nested keys are separated by a double underscore, e.g. `GIFTSYNC_API__BASE_URL`.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed("GIFTSYNC_").split("__"));
    Ok(figment.extract::<Config>()?.into_latest())
}

/// Parse a config from an in-memory YAML document.
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::new().merge(Yaml::string(yaml));
    Ok(figment.extract::<Config>()?.into_latest())
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

/// Where the remote REST API lives and how long a single call may take.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

/// Route names the guard needs to know about.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RoutesConfig {
    #[serde(default = "default_login_route")]
    pub login: String,
    #[serde(default = "default_home_route")]
    pub home: String,
    /// Paths reachable without a session; `:name` segments match any single segment.
    #[serde(default = "default_public_routes")]
    pub public: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: default_login_route(),
            home: default_home_route(),
            public: default_public_routes(),
        }
    }
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_home_route() -> String {
    "/".to_string()
}

fn default_public_routes() -> Vec<String> {
    vec![
        "/forgot-password".to_string(),
        "/reset-password/:uid/:token".to_string(),
    ]
}

/// Device-level presentation defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct UiConfig {
    /// Stand-in for the system colour-scheme preference, used when no theme is stored.
    #[serde(default)]
    pub prefers_dark: bool,
}
