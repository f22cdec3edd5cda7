use std::sync::Arc;

use crate::config::Settings;
use crate::domain::{DEFAULT_AGENT_NAME, DEFAULT_MODEL_CONFIG_ID};
use crate::error::CoreError;
use crate::mcp::{McpConfig, McpManager, McpServerType};
use crate::model::{ModelConfig, ModelConfigManager};
use crate::persistence::InMemoryConfigStore;

use super::{AgentConfig, AgentConfigManager};

struct Fixture {
    agents: AgentConfigManager,
    models: Arc<ModelConfigManager>,
    mcp: Arc<McpManager>,
}

fn fixture() -> Fixture {
    let models = Arc::new(ModelConfigManager::new(
        Arc::new(InMemoryConfigStore::new()),
        &Settings::default(),
    ));
    let mcp = Arc::new(McpManager::new(Arc::new(InMemoryConfigStore::new())));
    let agents = AgentConfigManager::new(
        Arc::new(InMemoryConfigStore::new()),
        models.clone(),
        mcp.clone(),
    );
    Fixture {
        agents,
        models,
        mcp,
    }
}

fn model(app: &str, id: &str) -> ModelConfig {
    ModelConfig {
        app_name: app.to_string(),
        model_id: id.to_string(),
        base_url: "http://llm.example/v1".to_string(),
        api_key: "key".to_string(),
        model: "test-model".to_string(),
    }
}

fn agent(app: &str, name: &str, model_id: &str) -> AgentConfig {
    AgentConfig {
        app_name: app.to_string(),
        agent_name: name.to_string(),
        agent_type: "llm".to_string(),
        description: "test agent".to_string(),
        instruction: "be helpful".to_string(),
        model_config_id: model_id.to_string(),
        tool_ids: vec![],
        mcp_ids: vec![],
        sub_agent_names: vec![],
    }
}

#[tokio::test]
async fn test_create_rejects_missing_model_reference() {
    let f = fixture();

    let err = f.agents.create(&agent("app", "a", "nope")).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidReference(_)));

    // Once the model exists the same create succeeds.
    f.models.create(&model("app", "nope")).await.unwrap();
    f.agents.create(&agent("app", "a", "nope")).await.unwrap();
}

#[tokio::test]
async fn test_create_rejects_missing_mcp_reference() {
    let f = fixture();
    f.models.create(&model("app", "m")).await.unwrap();

    let config = AgentConfig {
        mcp_ids: vec!["missing".to_string()],
        ..agent("app", "a", "m")
    };
    let err = f.agents.create(&config).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidReference(_)));

    f.mcp
        .register_builtin(&McpConfig {
            mcp_id: "missing".to_string(),
            app_name: "app".to_string(),
            name: "srv".to_string(),
            description: "test server".to_string(),
            server_type: McpServerType::Http,
            command: None,
            args: vec![],
            url: Some("http://localhost:8090/mcp".to_string()),
            headers: Default::default(),
            env: Default::default(),
            tool_filter: vec![],
            timeout: 30,
            retry_count: 3,
        })
        .await
        .unwrap();
    f.agents.create(&config).await.unwrap();
}

#[tokio::test]
async fn test_reserved_name_rejected_on_mutation() {
    let f = fixture();
    let reserved = agent("app", DEFAULT_AGENT_NAME, "m");

    assert!(matches!(
        f.agents.create(&reserved).await.unwrap_err(),
        CoreError::ReservedId(_)
    ));
    assert!(matches!(
        f.agents.update(&reserved).await.unwrap_err(),
        CoreError::ReservedId(_)
    ));
    assert!(matches!(
        f.agents.delete("app", DEFAULT_AGENT_NAME).await.unwrap_err(),
        CoreError::ReservedId(_)
    ));
}

#[tokio::test]
async fn test_builtin_default_surfaced_by_get_not_list() {
    let f = fixture();

    let default = f
        .agents
        .get("some-app", DEFAULT_AGENT_NAME)
        .await
        .unwrap()
        .expect("built-in default always resolves through get");
    assert_eq!(default.app_name, "some-app");
    assert_eq!(default.model_config_id, DEFAULT_MODEL_CONFIG_ID);
    assert!(f.agents.is_builtin(DEFAULT_AGENT_NAME));
    assert!(!f.agents.is_builtin("other"));

    assert!(f.agents.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_revalidates_references() {
    let f = fixture();
    f.models.create(&model("app", "m")).await.unwrap();
    f.agents.create(&agent("app", "a", "m")).await.unwrap();

    let err = f
        .agents
        .update(&agent("app", "a", "gone"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidReference(_)));
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let f = fixture();
    assert!(f.agents.get("app", "missing").await.unwrap().is_none());
}
