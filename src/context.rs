//! Runtime context
//!
//! The root holder of the runtime: constructs every store and manager in
//! dependency order at `start`, tears them down in reverse at `stop`. Not
//! a singleton; tests and embedders construct their own.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::{AgentConfigManager, AgentFactory};
use crate::config::{Settings, StorageKind};
use crate::engine::{
    ArtifactStore, Engine, InMemoryArtifactStore, InMemoryMemoryStore, InMemorySessionStore,
    MemoryStore, SessionStore,
};
use crate::error::{CoreError, CoreResult};
use crate::mcp::{McpConfig, McpManager};
use crate::model::{ModelConfig, ModelConfigManager};
use crate::persistence::{open_pool, ConfigStore, InMemoryConfigStore, SqlConfigStore};
use crate::session::SessionManager;
use crate::tool::ToolManager;

struct Services {
    session_store: Arc<dyn SessionStore>,
    artifact_store: Arc<dyn ArtifactStore>,
    memory_store: Arc<dyn MemoryStore>,
    tool_manager: Arc<ToolManager>,
    mcp_manager: Arc<McpManager>,
    model_config_manager: Arc<ModelConfigManager>,
    agent_config_manager: Arc<AgentConfigManager>,
    agent_factory: Arc<AgentFactory>,
    session_manager: Arc<SessionManager>,
}

/// Root object of the runtime
pub struct Context {
    settings: Settings,
    engine: Arc<dyn Engine>,
    services: Option<Services>,
}

impl Context {
    /// Build an unstarted context. Accessors return `None` until
    /// [`start`](Self::start) succeeds.
    pub fn new(settings: Settings, engine: Arc<dyn Engine>) -> Self {
        Self {
            settings,
            engine,
            services: None,
        }
    }

    /// Construct all services and managers in dependency order.
    ///
    /// Fails with `InvalidState` when called again without an intervening
    /// [`stop`](Self::stop).
    pub async fn start(&mut self) -> CoreResult<()> {
        if self.services.is_some() {
            return Err(CoreError::InvalidState(
                "context is already started".into(),
            ));
        }

        // Engine services first; conversation state is engine-owned and
        // stays in memory regardless of the config storage mode.
        let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let artifact_store: Arc<dyn ArtifactStore> = Arc::new(InMemoryArtifactStore::new());
        let memory_store: Arc<dyn MemoryStore> = Arc::new(InMemoryMemoryStore::new());

        // Config stores per the bootstrap storage mode.
        let (model_store, agent_store, mcp_store) = self.build_config_stores().await?;

        let tool_manager = Arc::new(ToolManager::new());

        let mcp_manager = Arc::new(McpManager::new(mcp_store));
        tracing::info!("McpManager created");

        let model_config_manager = Arc::new(ModelConfigManager::new(model_store, &self.settings));
        tracing::info!("ModelConfigManager created");

        let agent_config_manager = Arc::new(AgentConfigManager::new(
            agent_store,
            model_config_manager.clone(),
            mcp_manager.clone(),
        ));
        tracing::info!("AgentConfigManager created");

        let agent_factory = Arc::new(AgentFactory::new(
            self.engine.clone(),
            session_store.clone(),
            artifact_store.clone(),
            memory_store.clone(),
            tool_manager.clone(),
            mcp_manager.clone(),
            model_config_manager.clone(),
            agent_config_manager.clone(),
        ));
        tracing::info!("AgentFactory created");

        let session_manager = Arc::new(SessionManager::new(
            session_store.clone(),
            agent_factory.clone(),
        ));
        tracing::info!("SessionManager created");

        self.services = Some(Services {
            session_store,
            artifact_store,
            memory_store,
            tool_manager,
            mcp_manager,
            model_config_manager,
            agent_config_manager,
            agent_factory,
            session_manager,
        });
        Ok(())
    }

    /// Drain all sessions, then release managers and engine services in
    /// reverse construction order. Safe to call on a stopped context.
    pub async fn stop(&mut self) {
        if let Some(services) = self.services.take() {
            services.session_manager.shutdown().await;
        }
    }

    /// Whether the context is currently started.
    pub fn is_started(&self) -> bool {
        self.services.is_some()
    }

    pub fn session_manager(&self) -> Option<Arc<SessionManager>> {
        self.services.as_ref().map(|s| s.session_manager.clone())
    }

    pub fn agent_factory(&self) -> Option<Arc<AgentFactory>> {
        self.services.as_ref().map(|s| s.agent_factory.clone())
    }

    pub fn agent_config_manager(&self) -> Option<Arc<AgentConfigManager>> {
        self.services.as_ref().map(|s| s.agent_config_manager.clone())
    }

    pub fn model_config_manager(&self) -> Option<Arc<ModelConfigManager>> {
        self.services.as_ref().map(|s| s.model_config_manager.clone())
    }

    pub fn mcp_manager(&self) -> Option<Arc<McpManager>> {
        self.services.as_ref().map(|s| s.mcp_manager.clone())
    }

    pub fn tool_manager(&self) -> Option<Arc<ToolManager>> {
        self.services.as_ref().map(|s| s.tool_manager.clone())
    }

    pub fn session_store(&self) -> Option<Arc<dyn SessionStore>> {
        self.services.as_ref().map(|s| s.session_store.clone())
    }

    pub fn artifact_store(&self) -> Option<Arc<dyn ArtifactStore>> {
        self.services.as_ref().map(|s| s.artifact_store.clone())
    }

    pub fn memory_store(&self) -> Option<Arc<dyn MemoryStore>> {
        self.services.as_ref().map(|s| s.memory_store.clone())
    }

    async fn build_config_stores(
        &self,
    ) -> CoreResult<(
        Arc<dyn ConfigStore<ModelConfig>>,
        Arc<dyn ConfigStore<crate::agent::AgentConfig>>,
        Arc<dyn ConfigStore<McpConfig>>,
    )> {
        match self.settings.storage {
            StorageKind::Memory => Ok((
                Arc::new(InMemoryConfigStore::new()),
                Arc::new(InMemoryConfigStore::new()),
                Arc::new(InMemoryConfigStore::new()),
            )),
            StorageKind::Sql => {
                let url = self.settings.database_url.as_deref().ok_or_else(|| {
                    CoreError::Validation(
                        "database_url is required when storage is 'sql'".into(),
                    )
                })?;
                let pool = open_pool(
                    url,
                    self.settings.database_max_connections,
                    Duration::from_secs(self.settings.database_connect_timeout_secs),
                )
                .await?;

                Ok((
                    Arc::new(SqlConfigStore::<ModelConfig>::new(pool.clone()).await?),
                    Arc::new(SqlConfigStore::<crate::agent::AgentConfig>::new(pool.clone()).await?),
                    Arc::new(SqlConfigStore::<McpConfig>::new(pool).await?),
                ))
            }
        }
    }
}
