//! Session lifecycle manager
//!
//! Owns the global pool of active sessions: creation, lookup, listing,
//! deletion, the concurrency cap, and cooperative idle reaping. The global
//! lock guards pool mutation only; engine calls and session cleanup happen
//! outside it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use crate::agent::AgentFactory;
use crate::domain::SessionKey;
use crate::engine::SessionStore;
use crate::error::{CoreError, CoreResult};

use super::Session;

/// Manager of all active sessions
pub struct SessionManager {
    session_store: Arc<dyn SessionStore>,
    factory: Arc<AgentFactory>,
    pool: Mutex<HashMap<SessionKey, Arc<Session>>>,
    max_concurrent: Mutex<Option<usize>>,
}

impl SessionManager {
    pub fn new(session_store: Arc<dyn SessionStore>, factory: Arc<AgentFactory>) -> Self {
        Self {
            session_store,
            factory,
            pool: Mutex::new(HashMap::new()),
            max_concurrent: Mutex::new(None),
        }
    }

    /// Create a session, generating the session id when absent.
    ///
    /// Idempotent on triple collision: an existing session for the triple
    /// is returned as-is. Fails with `Overloaded` when the concurrency cap
    /// would be exceeded.
    pub async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> CoreResult<Arc<Session>> {
        {
            let pool = self.pool.lock().await;
            if let Some(sid) = session_id {
                let key = SessionKey::new(app_name, user_id, sid);
                if let Some(existing) = pool.get(&key) {
                    existing.touch().await;
                    return Ok(existing.clone());
                }
            }
            self.check_capacity(pool.len()).await?;
        }

        let sid = session_id
            .map(ToString::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let key = SessionKey::new(app_name, user_id, sid);

        // Engine-side record first, outside the pool lock.
        self.session_store.create(&key, None).await?;

        let session = Arc::new(Session::new(key.clone(), self.factory.clone()));

        let mut pool = self.pool.lock().await;
        if let Some(existing) = pool.get(&key) {
            // A concurrent create for the same triple won.
            return Ok(existing.clone());
        }
        if let Err(e) = self.check_capacity(pool.len()).await {
            drop(pool);
            let _ = self.session_store.delete(&key).await;
            return Err(e);
        }
        pool.insert(key.clone(), session.clone());

        tracing::info!(
            "Created session: {} for user {user_id} in app {app_name}",
            key.session_id
        );
        Ok(session)
    }

    /// Look up a session by triple.
    ///
    /// On a pool miss the engine's session store is consulted: a known
    /// triple is materialized into a fresh session wrapper, an unknown one
    /// yields `None`.
    pub async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> CoreResult<Option<Arc<Session>>> {
        let key = SessionKey::new(app_name, user_id, session_id);

        {
            let pool = self.pool.lock().await;
            if let Some(session) = pool.get(&key) {
                session.touch().await;
                return Ok(Some(session.clone()));
            }
        }

        if self.session_store.get(&key).await?.is_none() {
            return Ok(None);
        }

        tracing::debug!("Materializing session wrapper for known triple {key}");
        let session = Arc::new(Session::new(key.clone(), self.factory.clone()));
        let mut pool = self.pool.lock().await;
        Ok(Some(pool.entry(key).or_insert(session).clone()))
    }

    /// All active sessions of one app/user pair.
    pub async fn list_sessions(&self, app_name: &str, user_id: &str) -> Vec<Arc<Session>> {
        let pool = self.pool.lock().await;
        pool.iter()
            .filter(|(key, _)| key.matches(app_name, user_id))
            .map(|(_, session)| session.clone())
            .collect()
    }

    /// Delete a session and its engine-side record. Idempotent.
    pub async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> CoreResult<()> {
        let key = SessionKey::new(app_name, user_id, session_id);

        let removed = {
            let mut pool = self.pool.lock().await;
            pool.remove(&key)
        };
        if let Some(session) = removed {
            session.cleanup().await;
        }

        self.session_store.delete(&key).await?;

        tracing::info!("Deleted session: {session_id} for user {user_id} in app {app_name}");
        Ok(())
    }

    /// Reap sessions idle for longer than `timeout`.
    ///
    /// Cooperative: invoked by the host, never automatic. Cleanup takes
    /// each session's own lock, so a session actively processing a message
    /// is drained, not interrupted. Engine-side delete failures are logged
    /// and skipped.
    pub async fn cleanup_inactive_sessions(&self, timeout: Duration) {
        let now = Instant::now();

        let mut expired = Vec::new();
        {
            let pool = self.pool.lock().await;
            for (key, session) in pool.iter() {
                if now.duration_since(session.last_access().await) > timeout {
                    expired.push(key.clone());
                }
            }
        }

        for key in expired {
            let removed = {
                let mut pool = self.pool.lock().await;
                pool.remove(&key)
            };
            if let Some(session) = removed {
                session.cleanup().await;
            }
            match self.session_store.delete(&key).await {
                Ok(()) => tracing::info!("Cleaned up expired session: {key}"),
                Err(e) => {
                    tracing::warn!("Failed to delete expired engine session {key}: {e}")
                }
            }
        }
    }

    /// Update the concurrency cap. Existing sessions are not evicted.
    pub async fn set_concurrent_limit(&self, limit: Option<usize>) {
        *self.max_concurrent.lock().await = limit;
    }

    /// Number of active sessions.
    pub async fn session_count(&self) -> usize {
        self.pool.lock().await.len()
    }

    /// Delete every active session; used at context shutdown.
    pub async fn shutdown(&self) {
        let keys: Vec<SessionKey> = {
            let pool = self.pool.lock().await;
            pool.keys().cloned().collect()
        };
        for key in keys {
            if let Err(e) = self
                .delete_session(&key.app_name, &key.user_id, &key.session_id)
                .await
            {
                tracing::warn!("Failed to delete session {key} during shutdown: {e}");
            }
        }
    }

    async fn check_capacity(&self, active: usize) -> CoreResult<()> {
        if let Some(limit) = *self.max_concurrent.lock().await {
            if active >= limit {
                return Err(CoreError::Overloaded(limit));
            }
        }
        Ok(())
    }
}
