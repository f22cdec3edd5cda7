//! MCP tool configuration
//!
//! Config records describing external MCP servers, the tiered manager for
//! them, and the opaque toolset handles the engine materializes into tools.
//! The MCP wire protocol and its transports live behind the engine facade.

mod manager;

#[cfg(test)]
mod manager_test;

pub use manager::McpManager;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::persistence::ConfigRecord;

/// Transport used to reach an MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpServerType {
    /// Spawned subprocess speaking over stdio
    Stdio,
    /// Server-sent events endpoint
    Sse,
    /// Streamable HTTP endpoint
    Http,
}

/// Configuration for one MCP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpConfig {
    /// Unique identifier within `(app_name, tier)`
    pub mcp_id: String,
    /// Owning application
    pub app_name: String,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Transport type
    pub server_type: McpServerType,
    /// Launch command, required for `stdio`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Launch arguments for `stdio`
    #[serde(default)]
    pub args: Vec<String>,
    /// Endpoint URL, required for `sse` and `http`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// HTTP headers for `sse` and `http`
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Environment variables for `stdio`
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Restrict the toolset to these tool names; empty means all
    #[serde(default)]
    pub tool_filter: Vec<String>,
    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Connection retry count
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
}

fn default_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

impl McpConfig {
    /// Check the structural invariants of this config.
    pub fn validate(&self) -> CoreResult<()> {
        if self.app_name.is_empty() {
            return Err(CoreError::Validation("app_name cannot be empty".into()));
        }
        if self.mcp_id.is_empty() {
            return Err(CoreError::Validation("mcp_id cannot be empty".into()));
        }
        if self.name.is_empty() {
            return Err(CoreError::Validation("name cannot be empty".into()));
        }
        if self.description.is_empty() {
            return Err(CoreError::Validation("description cannot be empty".into()));
        }
        match self.server_type {
            McpServerType::Stdio => {
                if self.command.as_deref().unwrap_or("").is_empty() {
                    return Err(CoreError::Validation(
                        "command cannot be empty when server_type is 'stdio'".into(),
                    ));
                }
            }
            McpServerType::Sse | McpServerType::Http => {
                if self.url.as_deref().unwrap_or("").is_empty() {
                    return Err(CoreError::Validation(
                        "url cannot be empty when server_type is 'sse' or 'http'".into(),
                    ));
                }
            }
        }
        if self.timeout == 0 {
            return Err(CoreError::Validation(
                "timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl ConfigRecord for McpConfig {
    const KIND: &'static str = "mcp_configs";

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn record_id(&self) -> &str {
        &self.mcp_id
    }
}

/// Connection parameters carried by a toolset handle
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionParams {
    Stdio {
        command: String,
        args: Vec<String>,
        env: HashMap<String, String>,
    },
    Sse {
        url: String,
        headers: HashMap<String, String>,
    },
    Http {
        url: String,
        headers: HashMap<String, String>,
    },
}

/// Opaque handle to a bundle of MCP tools.
///
/// Built fresh per agent creation from one [`McpConfig`]; the engine
/// materializes it into callable tools when constructing the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolsetHandle {
    pub name: String,
    pub connection: ConnectionParams,
    pub tool_filter: Vec<String>,
    pub timeout: Duration,
    pub retry_count: u32,
}

impl ToolsetHandle {
    /// Derive a handle from a validated config.
    pub fn from_config(config: &McpConfig) -> CoreResult<Self> {
        let connection = match config.server_type {
            McpServerType::Stdio => ConnectionParams::Stdio {
                command: config.command.clone().ok_or_else(|| {
                    CoreError::Validation("stdio config is missing a command".into())
                })?,
                args: config.args.clone(),
                env: config.env.clone(),
            },
            McpServerType::Sse => ConnectionParams::Sse {
                url: config
                    .url
                    .clone()
                    .ok_or_else(|| CoreError::Validation("sse config is missing a url".into()))?,
                headers: config.headers.clone(),
            },
            McpServerType::Http => ConnectionParams::Http {
                url: config
                    .url
                    .clone()
                    .ok_or_else(|| CoreError::Validation("http config is missing a url".into()))?,
                headers: config.headers.clone(),
            },
        };

        Ok(Self {
            name: config.name.clone(),
            connection,
            tool_filter: config.tool_filter.clone(),
            timeout: Duration::from_secs(config.timeout),
            retry_count: config.retry_count,
        })
    }
}
