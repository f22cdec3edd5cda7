//! MCP configuration manager
//!
//! Two disjoint tiers: built-in configs registered at startup and held in
//! memory (permanent, immutable) and custom configs persisted through the
//! config store (fully mutable). Lookups consult the built-in tier first.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::global_id;
use crate::error::{CoreError, CoreResult};
use crate::persistence::{ConfigKey, ConfigStore};

use super::{McpConfig, ToolsetHandle};

/// Manager for built-in and custom MCP configurations
pub struct McpManager {
    builtin: RwLock<HashMap<ConfigKey, McpConfig>>,
    custom: Arc<dyn ConfigStore<McpConfig>>,
}

impl McpManager {
    pub fn new(custom: Arc<dyn ConfigStore<McpConfig>>) -> Self {
        Self {
            builtin: RwLock::new(HashMap::new()),
            custom,
        }
    }

    /// Register a built-in config. Built-ins live in memory only and
    /// cannot be updated or deleted afterwards.
    pub async fn register_builtin(&self, config: &McpConfig) -> CoreResult<()> {
        config.validate()?;

        let key = ConfigKey::new(&config.app_name, &config.mcp_id);
        let mut builtin = self.builtin.write().await;
        if builtin.contains_key(&key) {
            return Err(CoreError::AlreadyExists(format!(
                "built-in MCP config '{key}'"
            )));
        }
        builtin.insert(key.clone(), config.clone());

        tracing::info!("Registered built-in MCP config: {key}");
        Ok(())
    }

    /// Built-in configs are permanent; this fails whenever the key names
    /// one. An absent key is only logged.
    pub async fn unregister_builtin(&self, app_name: &str, mcp_id: &str) -> CoreResult<()> {
        let key = ConfigKey::new(app_name, mcp_id);
        let builtin = self.builtin.read().await;
        if builtin.contains_key(&key) {
            return Err(CoreError::NotPermitted(
                "built-in MCP configs cannot be unregistered".into(),
            ));
        }
        tracing::warn!("Attempted to unregister non-existent built-in MCP config: {key}");
        Ok(())
    }

    /// Register a custom (persisted) config.
    pub async fn register_custom(&self, config: &McpConfig) -> CoreResult<()> {
        config.validate()?;
        self.custom.create(config).await?;
        tracing::info!(
            "Registered custom MCP config: {}",
            global_id(&config.app_name, &config.mcp_id)
        );
        Ok(())
    }

    /// Update a custom config.
    ///
    /// The tiers are disjoint: a built-in key is simply absent from the
    /// custom store, so updating it fails with `NotFound`.
    pub async fn update_custom(
        &self,
        app_name: &str,
        mcp_id: &str,
        config: &McpConfig,
    ) -> CoreResult<()> {
        config.validate()?;
        if config.app_name != app_name || config.mcp_id != mcp_id {
            return Err(CoreError::Validation(format!(
                "config key '{}' does not match update target '{}'",
                global_id(&config.app_name, &config.mcp_id),
                global_id(app_name, mcp_id)
            )));
        }

        let key = ConfigKey::new(app_name, mcp_id);
        self.custom.update(config).await?;
        tracing::info!("Updated custom MCP config: {key}");
        Ok(())
    }

    /// Remove a custom config; idempotent.
    pub async fn unregister_custom(&self, app_name: &str, mcp_id: &str) -> CoreResult<()> {
        let key = ConfigKey::new(app_name, mcp_id);
        self.custom.delete(&key).await?;
        tracing::info!("Unregistered custom MCP config: {key}");
        Ok(())
    }

    /// Look up a config in either tier, built-in first.
    pub async fn get(&self, app_name: &str, mcp_id: &str) -> CoreResult<Option<McpConfig>> {
        let key = ConfigKey::new(app_name, mcp_id);
        if let Some(config) = self.builtin.read().await.get(&key) {
            return Ok(Some(config.clone()));
        }
        Ok(self.custom.get(&key).await?)
    }

    /// All configs of both tiers for one app, keyed `"app_name:mcp_id"`.
    pub async fn list(&self, app_name: &str) -> CoreResult<HashMap<String, McpConfig>> {
        let mut configs = HashMap::new();

        for (key, config) in self.builtin.read().await.iter() {
            if key.app_name == app_name {
                configs.insert(global_id(&key.app_name, &key.record_id), config.clone());
            }
        }

        for config in self.custom.list().await? {
            if config.app_name == app_name {
                configs.insert(global_id(&config.app_name, &config.mcp_id), config);
            }
        }

        Ok(configs)
    }

    /// Build a fresh toolset handle from a resolved config.
    ///
    /// Handles are never cached here; each agent creation gets its own.
    pub async fn create_toolset(&self, app_name: &str, mcp_id: &str) -> CoreResult<ToolsetHandle> {
        let config = self.get(app_name, mcp_id).await?.ok_or_else(|| {
            CoreError::NotFound(format!(
                "MCP config '{}'",
                global_id(app_name, mcp_id)
            ))
        })?;

        tracing::debug!(
            "Creating toolset handle for {}",
            global_id(app_name, mcp_id)
        );
        ToolsetHandle::from_config(&config)
    }
}
