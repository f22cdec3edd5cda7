//! Engine facade
//!
//! Thin interfaces over the underlying LLM execution engine. The runtime
//! consumes these traits and never reaches past them: model invocation,
//! MCP transports, and conversation persistence all live behind this
//! boundary. In-memory store implementations ship in [`memory`] for the
//! default storage mode and for tests; runner construction always comes
//! from a caller-supplied [`Engine`].

mod memory;

pub use memory::{InMemoryArtifactStore, InMemoryMemoryStore, InMemorySessionStore};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Content, Event, SessionKey};
use crate::mcp::ToolsetHandle;

/// Errors raised behind the engine facade
#[derive(Debug, Error)]
pub enum EngineError {
    /// Session store operation failed
    #[error("session store error: {0}")]
    Session(String),

    /// The event stream of a run failed mid-flight
    #[error("stream error: {0}")]
    Stream(String),

    /// Runner construction or teardown failed
    #[error("runner error: {0}")]
    Runner(String),
}

/// Event stream produced by one engine run attempt.
pub type RunnerEventStream = BoxStream<'static, Result<Event, EngineError>>;

/// Session record held by the engine's session store.
#[derive(Debug, Clone)]
pub struct EngineSession {
    pub key: SessionKey,
    pub state: HashMap<String, Value>,
    pub events: Vec<Event>,
}

/// Conversation persistence owned by the engine, keyed by session triple.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session record; returns the existing record when the
    /// triple is already known.
    async fn create(
        &self,
        key: &SessionKey,
        state: Option<HashMap<String, Value>>,
    ) -> Result<EngineSession, EngineError>;

    async fn get(&self, key: &SessionKey) -> Result<Option<EngineSession>, EngineError>;

    /// Delete a session record; absent keys are not an error.
    async fn delete(&self, key: &SessionKey) -> Result<(), EngineError>;

    async fn list(&self, app_name: &str, user_id: &str)
        -> Result<Vec<EngineSession>, EngineError>;

    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<(), EngineError>;
}

/// Artifact persistence; opaque to the core, passed through to runners.
pub trait ArtifactStore: Send + Sync {}

/// Long-term memory service; opaque to the core, passed through to runners.
pub trait MemoryStore: Send + Sync {}

/// An engine-compatible tool.
///
/// Handles are registered with the tool manager and handed to the engine
/// when an agent is constructed; the engine decides when to invoke them.
#[async_trait]
pub trait ToolHandle: Send + Sync {
    fn name(&self) -> &str;

    async fn call(&self, args: Value) -> anyhow::Result<Value>;
}

/// Resolved model connection parameters handed to the engine.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Everything the engine needs to materialize one agent instance.
pub struct AgentSpec {
    pub name: String,
    pub description: String,
    pub instruction: String,
    pub model: ModelDescriptor,
    pub tools: Vec<Arc<dyn ToolHandle>>,
    pub toolsets: Vec<ToolsetHandle>,
    pub sub_agents: Vec<String>,
}

/// One engine run loop bound to an agent and a set of stores.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Start one run attempt.
    ///
    /// `new_message` is `Some` only when a user turn is being submitted;
    /// `None` resumes from the session history already held by the engine.
    fn run_async(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Option<Content>,
    ) -> RunnerEventStream;

    /// Release engine-side resources held by this runner.
    async fn cleanup(&self) -> Result<(), EngineError>;
}

/// Entry point into the engine: builds runners for resolved agent specs.
pub trait Engine: Send + Sync {
    fn build_runner(
        &self,
        app_name: &str,
        spec: AgentSpec,
        sessions: Arc<dyn SessionStore>,
        artifacts: Arc<dyn ArtifactStore>,
        memory: Arc<dyn MemoryStore>,
    ) -> Arc<dyn Runner>;
}
