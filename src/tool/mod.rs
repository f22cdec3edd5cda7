//! In-process tool registry
//!
//! Maps `(app_name, tool_id)` to engine-compatible tool handles. Handles
//! are either registered pre-built or wrapped from plain async callables.


use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::global_id;
use crate::engine::ToolHandle;
use crate::error::{CoreError, CoreResult};

type ToolFn = dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync;

/// A tool handle wrapping a plain async callable
pub struct FunctionTool {
    name: String,
    func: Box<ToolFn>,
}

impl FunctionTool {
    /// Wrap an async callable into an engine-compatible tool handle.
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(move |args| -> BoxFuture<'static, anyhow::Result<Value>> {
                Box::pin(func(args))
            }),
        }
    }
}

#[async_trait]
impl ToolHandle for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, args: Value) -> anyhow::Result<Value> {
        (self.func)(args).await
    }
}

/// Registry of tool handles, isolated per app
#[derive(Default)]
pub struct ToolManager {
    // app_name -> tool_id -> handle
    app_index: RwLock<HashMap<String, HashMap<String, Arc<dyn ToolHandle>>>>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built tool handle.
    pub async fn register_tool(
        &self,
        tool: Arc<dyn ToolHandle>,
        app_name: &str,
        tool_id: &str,
    ) -> CoreResult<()> {
        if app_name.is_empty() {
            return Err(CoreError::Validation("app_name cannot be empty".into()));
        }
        if tool_id.is_empty() {
            return Err(CoreError::Validation("tool_id cannot be empty".into()));
        }

        let mut index = self.app_index.write().await;
        let tools = index.entry(app_name.to_string()).or_default();
        if tools.contains_key(tool_id) {
            return Err(CoreError::AlreadyExists(format!(
                "tool '{}'",
                global_id(app_name, tool_id)
            )));
        }
        tools.insert(tool_id.to_string(), tool);

        tracing::info!("Registered tool: {}", global_id(app_name, tool_id));
        Ok(())
    }

    /// Wrap an async callable and register it.
    pub async fn register_function<F, Fut>(
        &self,
        func: F,
        app_name: &str,
        tool_id: &str,
    ) -> CoreResult<()>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let tool = Arc::new(FunctionTool::new(tool_id, func));
        self.register_tool(tool, app_name, tool_id).await
    }

    /// Look up a tool handle.
    pub async fn get(&self, app_name: &str, tool_id: &str) -> Option<Arc<dyn ToolHandle>> {
        let index = self.app_index.read().await;
        index.get(app_name)?.get(tool_id).cloned()
    }

    /// All registered tools, optionally filtered by app, keyed
    /// `"app_name:tool_id"`.
    pub async fn list(&self, app_name: Option<&str>) -> HashMap<String, Arc<dyn ToolHandle>> {
        let index = self.app_index.read().await;
        let mut result = HashMap::new();
        for (app, tools) in index.iter() {
            if app_name.is_some_and(|filter| filter != app) {
                continue;
            }
            for (tool_id, tool) in tools {
                result.insert(global_id(app, tool_id), tool.clone());
            }
        }
        result
    }

    /// Globally unique identifier of a tool.
    pub fn global_id(&self, app_name: &str, tool_id: &str) -> String {
        global_id(app_name, tool_id)
    }
}
