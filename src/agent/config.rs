//! Agent configuration record

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_AGENT_NAME, DEFAULT_MODEL_CONFIG_ID};
use crate::persistence::ConfigRecord;

/// Configuration for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Owning application; `agent_name` is unique within it
    pub app_name: String,
    /// Unique agent name
    pub agent_name: String,
    /// Agent flavor understood by the engine
    #[serde(default = "default_agent_type")]
    pub agent_type: String,
    /// Human-readable description
    pub description: String,
    /// System instruction handed to the engine agent
    pub instruction: String,
    /// Referenced model config id; must resolve on write
    pub model_config_id: String,
    /// Referenced tool ids; each must resolve on write
    #[serde(default)]
    pub tool_ids: Vec<String>,
    /// Referenced MCP config ids; each must resolve on write
    #[serde(default)]
    pub mcp_ids: Vec<String>,
    /// Names of agents this agent can delegate to
    #[serde(default)]
    pub sub_agent_names: Vec<String>,
}

fn default_agent_type() -> String {
    "llm".to_string()
}

impl ConfigRecord for AgentConfig {
    const KIND: &'static str = "agent_configs";

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn record_id(&self) -> &str {
        &self.agent_name
    }
}

/// The built-in `"default"` agent config, synthesized for the requesting
/// app so its references resolve in that app's scope. It is never
/// persisted and always points at the reserved default model config.
pub fn default_agent_config(app_name: &str) -> AgentConfig {
    AgentConfig {
        app_name: app_name.to_string(),
        agent_name: DEFAULT_AGENT_NAME.to_string(),
        agent_type: default_agent_type(),
        description: "General-purpose conversational agent".to_string(),
        instruction: "You are a helpful assistant. Answer the user's questions directly and concisely.".to_string(),
        model_config_id: DEFAULT_MODEL_CONFIG_ID.to_string(),
        tool_ids: Vec::new(),
        mcp_ids: Vec::new(),
        sub_agent_names: Vec::new(),
    }
}
