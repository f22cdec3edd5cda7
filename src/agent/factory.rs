//! Agent factory
//!
//! Resolves an agent config into an engine runner bound to one session and
//! wraps it in a retrying executor. Stateless beyond its held services;
//! every call produces a fresh executor with its own engine state handle.

use std::sync::Arc;

use crate::domain::{global_id, SessionKey};
use crate::engine::{AgentSpec, ArtifactStore, Engine, MemoryStore, ModelDescriptor, SessionStore};
use crate::error::{CoreError, CoreResult};
use crate::mcp::McpManager;
use crate::model::ModelConfigManager;
use crate::tool::ToolManager;

use super::config_manager::AgentConfigManager;
use super::executor::{RetryingExecutor, DEFAULT_MAX_RETRIES};

/// Factory for session-bound agent executors
pub struct AgentFactory {
    engine: Arc<dyn Engine>,
    session_store: Arc<dyn SessionStore>,
    artifact_store: Arc<dyn ArtifactStore>,
    memory_store: Arc<dyn MemoryStore>,
    tool_manager: Arc<ToolManager>,
    mcp_manager: Arc<McpManager>,
    model_configs: Arc<ModelConfigManager>,
    agent_configs: Arc<AgentConfigManager>,
    max_retries: u32,
}

impl AgentFactory {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<dyn Engine>,
        session_store: Arc<dyn SessionStore>,
        artifact_store: Arc<dyn ArtifactStore>,
        memory_store: Arc<dyn MemoryStore>,
        tool_manager: Arc<ToolManager>,
        mcp_manager: Arc<McpManager>,
        model_configs: Arc<ModelConfigManager>,
        agent_configs: Arc<AgentConfigManager>,
    ) -> Self {
        Self {
            engine,
            session_store,
            artifact_store,
            memory_store,
            tool_manager,
            mcp_manager,
            model_configs,
            agent_configs,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the retry budget handed to new executors.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Materialize an executor for `agent_name` bound to the given session.
    pub async fn create_agent(
        &self,
        agent_name: &str,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> CoreResult<RetryingExecutor> {
        let config = self
            .agent_configs
            .get(app_name, agent_name)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "agent config '{}'",
                    global_id(app_name, agent_name)
                ))
            })?;

        let model = self
            .model_configs
            .get(&config.app_name, &config.model_config_id)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidReference(format!(
                    "model config '{}' does not resolve for app '{}'",
                    config.model_config_id, config.app_name
                ))
            })?;

        let mut tools = Vec::with_capacity(config.tool_ids.len());
        for tool_id in &config.tool_ids {
            let tool = self
                .tool_manager
                .get(&config.app_name, tool_id)
                .await
                .ok_or_else(|| {
                    CoreError::InvalidReference(format!(
                        "tool '{}' does not resolve",
                        global_id(&config.app_name, tool_id)
                    ))
                })?;
            tools.push(tool);
        }

        let mut toolsets = Vec::with_capacity(config.mcp_ids.len());
        for mcp_id in &config.mcp_ids {
            let toolset = self
                .mcp_manager
                .create_toolset(&config.app_name, mcp_id)
                .await
                .map_err(|err| match err {
                    CoreError::NotFound(what) => {
                        CoreError::InvalidReference(format!("{what} does not resolve"))
                    }
                    other => other,
                })?;
            toolsets.push(toolset);
        }

        let spec = AgentSpec {
            name: config.agent_name.clone(),
            description: config.description.clone(),
            instruction: config.instruction.clone(),
            model: ModelDescriptor {
                base_url: model.base_url,
                api_key: model.api_key,
                model: model.model,
            },
            tools,
            toolsets,
            sub_agents: config.sub_agent_names.clone(),
        };

        let runner = self.engine.build_runner(
            app_name,
            spec,
            self.session_store.clone(),
            self.artifact_store.clone(),
            self.memory_store.clone(),
        );

        tracing::info!("Created agent instance: {agent_name} for session {session_id}");

        Ok(RetryingExecutor::new(
            runner,
            SessionKey::new(app_name, user_id, session_id),
            self.max_retries,
        ))
    }
}
