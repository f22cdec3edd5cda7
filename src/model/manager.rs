//! Model configuration manager

use std::sync::Arc;

use crate::config::Settings;
use crate::domain::{DEFAULT_MODEL_APP_NAME, DEFAULT_MODEL_CONFIG_ID};
use crate::error::{CoreError, CoreResult};
use crate::persistence::{ConfigKey, ConfigStore};

use super::ModelConfig;

/// CRUD over model configs plus the built-in default.
///
/// The default config is derived from bootstrap settings at construction
/// time, lives only in memory, and is read-only thereafter. It is bound to
/// the reserved id [`DEFAULT_MODEL_CONFIG_ID`] and resolves for every app.
pub struct ModelConfigManager {
    store: Arc<dyn ConfigStore<ModelConfig>>,
    default_config: Option<ModelConfig>,
}

impl ModelConfigManager {
    /// Build the manager, caching the built-in default when all three
    /// default-LLM settings are present.
    pub fn new(store: Arc<dyn ConfigStore<ModelConfig>>, settings: &Settings) -> Self {
        let default_config = match (
            &settings.default_llm_base_url,
            &settings.default_llm_api_key,
            &settings.default_llm_model,
        ) {
            (Some(base_url), Some(api_key), Some(model)) => Some(ModelConfig {
                app_name: DEFAULT_MODEL_APP_NAME.to_string(),
                model_id: DEFAULT_MODEL_CONFIG_ID.to_string(),
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                model: model.clone(),
            }),
            _ => None,
        };

        if default_config.is_some() {
            tracing::info!("Cached built-in default model config");
        }

        Self {
            store,
            default_config,
        }
    }

    /// Create a persistent model config.
    pub async fn create(&self, config: &ModelConfig) -> CoreResult<()> {
        if config.model_id == DEFAULT_MODEL_CONFIG_ID {
            return Err(CoreError::ReservedId(format!(
                "model config '{DEFAULT_MODEL_CONFIG_ID}' is derived from bootstrap settings"
            )));
        }
        self.store.create(config).await?;
        Ok(())
    }

    /// Look up a model config; the reserved id resolves to the cached
    /// default (for any app) without touching the store.
    pub async fn get(&self, app_name: &str, model_id: &str) -> CoreResult<Option<ModelConfig>> {
        if model_id == DEFAULT_MODEL_CONFIG_ID {
            return Ok(self.default_config.clone());
        }
        let key = ConfigKey::new(app_name, model_id);
        Ok(self.store.get(&key).await?)
    }

    /// The cached built-in default, if bootstrap settings provided one.
    pub fn get_default(&self) -> Option<&ModelConfig> {
        self.default_config.as_ref()
    }

    /// Update a persistent model config.
    pub async fn update(&self, config: &ModelConfig) -> CoreResult<()> {
        if config.model_id == DEFAULT_MODEL_CONFIG_ID {
            return Err(CoreError::ReservedId(format!(
                "model config '{DEFAULT_MODEL_CONFIG_ID}' cannot be updated"
            )));
        }
        self.store.update(config).await?;
        Ok(())
    }

    /// Delete a persistent model config.
    pub async fn delete(&self, app_name: &str, model_id: &str) -> CoreResult<()> {
        if model_id == DEFAULT_MODEL_CONFIG_ID {
            return Err(CoreError::ReservedId(format!(
                "model config '{DEFAULT_MODEL_CONFIG_ID}' cannot be deleted"
            )));
        }
        let key = ConfigKey::new(app_name, model_id);
        self.store.delete(&key).await?;
        Ok(())
    }

    /// All model configs: store records first, the built-in default last.
    pub async fn list(&self) -> CoreResult<Vec<ModelConfig>> {
        let mut configs = self.store.list().await?;
        if let Some(default) = &self.default_config {
            configs.push(default.clone());
        }
        Ok(configs)
    }

    /// True when `model_id` resolves for `app_name`.
    pub async fn validate(&self, app_name: &str, model_id: &str) -> CoreResult<bool> {
        Ok(self.get(app_name, model_id).await?.is_some())
    }
}
