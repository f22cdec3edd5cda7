//! Model configuration
//!
//! LLM connection records and their manager, including the built-in
//! default derived from bootstrap settings.

mod manager;

#[cfg(test)]
mod manager_test;

pub use manager::ModelConfigManager;

use serde::{Deserialize, Serialize};

use crate::persistence::ConfigRecord;

/// Connection parameters for one LLM service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Owning application; `model_id` is unique within it
    pub app_name: String,
    /// Unique identifier of this config
    pub model_id: String,
    /// Base URL of the API endpoint
    pub base_url: String,
    /// API key for the service
    pub api_key: String,
    /// Model name used in API calls
    pub model: String,
}

impl ConfigRecord for ModelConfig {
    const KIND: &'static str = "model_configs";

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn record_id(&self) -> &str {
        &self.model_id
    }
}
