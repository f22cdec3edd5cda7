//! Agent configuration manager
//!
//! CRUD over agent configs with referential integrity: every write checks
//! that the referenced model config and MCP configs resolve at that moment.

use std::sync::Arc;

use crate::domain::DEFAULT_AGENT_NAME;
use crate::error::{CoreError, CoreResult};
use crate::mcp::McpManager;
use crate::model::ModelConfigManager;
use crate::persistence::{ConfigKey, ConfigStore};

use super::config::{default_agent_config, AgentConfig};

/// Manager for agent configurations
pub struct AgentConfigManager {
    store: Arc<dyn ConfigStore<AgentConfig>>,
    model_configs: Arc<ModelConfigManager>,
    mcp_manager: Arc<McpManager>,
}

impl AgentConfigManager {
    pub fn new(
        store: Arc<dyn ConfigStore<AgentConfig>>,
        model_configs: Arc<ModelConfigManager>,
        mcp_manager: Arc<McpManager>,
    ) -> Self {
        Self {
            store,
            model_configs,
            mcp_manager,
        }
    }

    /// Create a persistent agent config after validating its references.
    pub async fn create(&self, config: &AgentConfig) -> CoreResult<()> {
        if config.agent_name == DEFAULT_AGENT_NAME {
            return Err(CoreError::ReservedId(
                "the built-in default agent config cannot be created".into(),
            ));
        }
        self.check_references(config).await?;
        self.store.create(config).await?;
        Ok(())
    }

    /// Look up an agent config. The reserved `"default"` name resolves to
    /// the built-in config, synthesized for the requesting app.
    pub async fn get(&self, app_name: &str, agent_name: &str) -> CoreResult<Option<AgentConfig>> {
        if agent_name == DEFAULT_AGENT_NAME {
            return Ok(Some(default_agent_config(app_name)));
        }
        let key = ConfigKey::new(app_name, agent_name);
        Ok(self.store.get(&key).await?)
    }

    /// Update a persistent agent config after validating its references.
    pub async fn update(&self, config: &AgentConfig) -> CoreResult<()> {
        if config.agent_name == DEFAULT_AGENT_NAME {
            return Err(CoreError::ReservedId(
                "the built-in default agent config cannot be updated".into(),
            ));
        }
        self.check_references(config).await?;
        self.store.update(config).await?;
        Ok(())
    }

    /// Delete a persistent agent config.
    pub async fn delete(&self, app_name: &str, agent_name: &str) -> CoreResult<()> {
        if agent_name == DEFAULT_AGENT_NAME {
            return Err(CoreError::ReservedId(
                "the built-in default agent config cannot be deleted".into(),
            ));
        }
        let key = ConfigKey::new(app_name, agent_name);
        self.store.delete(&key).await?;
        Ok(())
    }

    /// All persistent agent configs. The built-in default is surfaced only
    /// through `get`, never listed.
    pub async fn list(&self) -> CoreResult<Vec<AgentConfig>> {
        Ok(self.store.list().await?)
    }

    /// True when `model_config_id` resolves for `app_name`.
    pub async fn validate_model_config(
        &self,
        app_name: &str,
        model_config_id: &str,
    ) -> CoreResult<bool> {
        self.model_configs.validate(app_name, model_config_id).await
    }

    /// True when every id in `mcp_ids` resolves for `app_name`.
    pub async fn validate_mcp_configs(
        &self,
        app_name: &str,
        mcp_ids: &[String],
    ) -> CoreResult<bool> {
        for mcp_id in mcp_ids {
            if self.mcp_manager.get(app_name, mcp_id).await?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether the name denotes the built-in agent config.
    pub fn is_builtin(&self, agent_name: &str) -> bool {
        agent_name == DEFAULT_AGENT_NAME
    }

    async fn check_references(&self, config: &AgentConfig) -> CoreResult<()> {
        if !self
            .validate_model_config(&config.app_name, &config.model_config_id)
            .await?
        {
            return Err(CoreError::InvalidReference(format!(
                "model config '{}' does not resolve for app '{}'",
                config.model_config_id, config.app_name
            )));
        }
        if !self
            .validate_mcp_configs(&config.app_name, &config.mcp_ids)
            .await?
        {
            return Err(CoreError::InvalidReference(format!(
                "one or more MCP configs in {:?} do not resolve for app '{}'",
                config.mcp_ids, config.app_name
            )));
        }
        Ok(())
    }
}
