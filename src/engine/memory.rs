//! In-memory engine store implementations
//!
//! Process-lifetime stores used by the `memory` storage mode and by tests.
//! Data is lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ArtifactStore, EngineError, EngineSession, MemoryStore, SessionStore};
use crate::domain::{Event, SessionKey};

/// In-memory session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, EngineSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        key: &SessionKey,
        state: Option<HashMap<String, Value>>,
    ) -> Result<EngineSession, EngineError> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(key) {
            return Ok(existing.clone());
        }
        let session = EngineSession {
            key: key.clone(),
            state: state.unwrap_or_default(),
            events: Vec::new(),
        };
        sessions.insert(key.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<EngineSession>, EngineError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(key).cloned())
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), EngineError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(key);
        Ok(())
    }

    async fn list(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<EngineSession>, EngineError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.key.matches(app_name, user_id))
            .cloned()
            .collect())
    }

    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<(), EngineError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| EngineError::Session(format!("session '{key}' not found")))?;
        session.events.push(event);
        Ok(())
    }
}

/// In-memory artifact store
#[derive(Default)]
pub struct InMemoryArtifactStore;

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactStore for InMemoryArtifactStore {}

/// In-memory long-term memory store
#[derive(Default)]
pub struct InMemoryMemoryStore;

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self
    }
}

impl MemoryStore for InMemoryMemoryStore {}
