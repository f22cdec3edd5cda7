//! Conversation sessions
//!
//! A session owns the pool of agent executors serving one conversation;
//! the manager owns the global set of sessions.

mod manager;

pub use manager::SessionManager;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::agent::{AgentFactory, RetryingExecutor};
use crate::domain::{EventStream, SessionKey, DEFAULT_AGENT_NAME};
use crate::error::CoreResult;

/// One isolated conversation session.
///
/// Holds a pool of executors keyed by agent name, lazily created on first
/// use. All per-conversation history lives in the engine's session store
/// keyed by the triple; the session itself only carries runtime state.
pub struct Session {
    key: SessionKey,
    factory: Arc<AgentFactory>,
    agents: Mutex<HashMap<String, Arc<RetryingExecutor>>>,
    state: Mutex<HashMap<String, Value>>,
    last_access: RwLock<Instant>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("key", &self.key).finish()
    }
}

impl Session {
    pub fn new(key: SessionKey, factory: Arc<AgentFactory>) -> Self {
        Self {
            key,
            factory,
            agents: Mutex::new(HashMap::new()),
            state: Mutex::new(HashMap::new()),
            last_access: RwLock::new(Instant::now()),
        }
    }

    /// Session triple identifying this session.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Dispatch a user message to an agent and stream its events.
    ///
    /// Falls back to the `"default"` agent when no name is given. The
    /// executor pool is consulted under the session lock; a miss creates
    /// the executor through the factory before the lock is released, so
    /// concurrent calls for the same agent share one instance.
    pub async fn process_message(
        &self,
        message: &str,
        agent_name: Option<&str>,
    ) -> CoreResult<EventStream> {
        self.touch().await;

        let agent_name = agent_name.unwrap_or(DEFAULT_AGENT_NAME);
        let executor = {
            let mut agents = self.agents.lock().await;
            match agents.get(agent_name) {
                Some(executor) => executor.clone(),
                None => {
                    let executor = Arc::new(
                        self.factory
                            .create_agent(
                                agent_name,
                                &self.key.app_name,
                                &self.key.user_id,
                                &self.key.session_id,
                            )
                            .await?,
                    );
                    agents.insert(agent_name.to_string(), executor.clone());
                    tracing::info!(
                        "Created agent {agent_name} for session {}",
                        self.key.session_id
                    );
                    executor
                }
            }
        };

        Ok(executor.run_async(message))
    }

    /// Read a value from the session's state bag.
    pub async fn get_state(&self, key: &str) -> Option<Value> {
        self.state.lock().await.get(key).cloned()
    }

    /// Write a value into the session's state bag.
    pub async fn set_state(&self, key: impl Into<String>, value: Value) {
        self.state.lock().await.insert(key.into(), value);
    }

    /// Dispose every pooled executor and clear the session state.
    pub async fn cleanup(&self) {
        let mut agents = self.agents.lock().await;
        for (agent_name, executor) in agents.iter() {
            match executor.cleanup().await {
                Ok(()) => tracing::info!(
                    "Cleaned up agent {agent_name} for session {}",
                    self.key.session_id
                ),
                Err(e) => tracing::warn!(
                    "Failed to clean up agent {agent_name} for session {}: {e}",
                    self.key.session_id
                ),
            }
        }
        agents.clear();
        self.state.lock().await.clear();
    }

    /// Number of executors currently pooled.
    pub async fn agent_count(&self) -> usize {
        self.agents.lock().await.len()
    }

    pub(crate) async fn touch(&self) {
        *self.last_access.write().await = Instant::now();
    }

    pub(crate) async fn last_access(&self) -> Instant {
        *self.last_access.read().await
    }
}
