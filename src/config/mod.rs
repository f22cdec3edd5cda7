//! Bootstrap configuration
//!
//! Host-supplied settings consumed once at context start: which config
//! store variant to use and the optional default LLM connection that seeds
//! the built-in model config.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Config store variant used for each config kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-lifetime in-memory stores
    #[default]
    Memory,
    /// SQL-backed stores (requires `database_url`)
    Sql,
}

/// Runtime bootstrap settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Config store variant
    #[serde(default)]
    pub storage: StorageKind,

    /// Database connection URL, required when `storage = sql`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Maximum connections in the database pool
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Database connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub database_connect_timeout_secs: u64,

    /// Base URL of the default LLM service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_llm_base_url: Option<String>,

    /// API key of the default LLM service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_llm_api_key: Option<String>,

    /// Model name of the default LLM service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_llm_model: Option<String>,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30
}

impl Settings {
    /// Load settings from `hydra.toml` (if present) layered with
    /// `HYDRA_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("hydra.toml")
    }

    /// Load settings from a specific file layered with `HYDRA_*`
    /// environment variables. The file is optional; the environment wins.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("HYDRA"))
            .build()?
            .try_deserialize()
    }

    /// True when all three default-LLM fields are present.
    pub fn has_default_llm(&self) -> bool {
        self.default_llm_base_url.is_some()
            && self.default_llm_api_key.is_some()
            && self.default_llm_model.is_some()
    }
}
