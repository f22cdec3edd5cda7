use std::sync::Arc;

use crate::config::Settings;
use crate::domain::DEFAULT_MODEL_CONFIG_ID;
use crate::error::CoreError;
use crate::persistence::InMemoryConfigStore;

use super::{ModelConfig, ModelConfigManager};

fn settings_with_default() -> Settings {
    Settings {
        default_llm_base_url: Some("http://localhost:8000/v1".to_string()),
        default_llm_api_key: Some("sk-test".to_string()),
        default_llm_model: Some("gpt-4o-mini".to_string()),
        ..Default::default()
    }
}

fn manager(settings: &Settings) -> ModelConfigManager {
    ModelConfigManager::new(Arc::new(InMemoryConfigStore::new()), settings)
}

fn sample(app: &str, id: &str) -> ModelConfig {
    ModelConfig {
        app_name: app.to_string(),
        model_id: id.to_string(),
        base_url: "http://llm.example/v1".to_string(),
        api_key: "key".to_string(),
        model: "test-model".to_string(),
    }
}

#[tokio::test]
async fn test_default_cached_when_bootstrap_complete() {
    let mgr = manager(&settings_with_default());

    let default = mgr
        .get("any-app", DEFAULT_MODEL_CONFIG_ID)
        .await
        .unwrap()
        .expect("default config cached");
    assert_eq!(default.model_id, DEFAULT_MODEL_CONFIG_ID);
    assert_eq!(default.app_name, "__default_app");
    assert_eq!(default.model, "gpt-4o-mini");
}

#[tokio::test]
async fn test_default_absent_when_bootstrap_incomplete() {
    let mgr = manager(&Settings::default());

    assert!(mgr
        .get("app", DEFAULT_MODEL_CONFIG_ID)
        .await
        .unwrap()
        .is_none());
    assert!(mgr.get_default().is_none());
    assert!(!mgr.validate("app", DEFAULT_MODEL_CONFIG_ID).await.unwrap());
}

#[tokio::test]
async fn test_reserved_id_rejected_on_mutation() {
    let mgr = manager(&settings_with_default());
    let reserved = ModelConfig {
        model_id: DEFAULT_MODEL_CONFIG_ID.to_string(),
        ..sample("app", "ignored")
    };

    assert!(matches!(
        mgr.create(&reserved).await.unwrap_err(),
        CoreError::ReservedId(_)
    ));
    assert!(matches!(
        mgr.update(&reserved).await.unwrap_err(),
        CoreError::ReservedId(_)
    ));
    assert!(matches!(
        mgr.delete("app", DEFAULT_MODEL_CONFIG_ID).await.unwrap_err(),
        CoreError::ReservedId(_)
    ));
}

#[tokio::test]
async fn test_crud_round_trip() {
    let mgr = manager(&Settings::default());
    let config = sample("app", "m1");

    mgr.create(&config).await.unwrap();
    assert_eq!(mgr.get("app", "m1").await.unwrap(), Some(config.clone()));

    // Update to an equal record is accepted and observable state is unchanged.
    mgr.update(&config).await.unwrap();
    assert_eq!(mgr.get("app", "m1").await.unwrap(), Some(config));

    mgr.delete("app", "m1").await.unwrap();
    assert!(mgr.get("app", "m1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_puts_default_last() {
    let mgr = manager(&settings_with_default());
    mgr.create(&sample("app", "m1")).await.unwrap();
    mgr.create(&sample("app", "m2")).await.unwrap();

    let configs = mgr.list().await.unwrap();
    assert_eq!(configs.len(), 3);
    assert_eq!(
        configs.last().unwrap().model_id,
        DEFAULT_MODEL_CONFIG_ID,
        "built-in default must always be listed last"
    );
}

#[tokio::test]
async fn test_validate_honors_app_scope() {
    let mgr = manager(&settings_with_default());
    mgr.create(&sample("app1", "m1")).await.unwrap();

    assert!(mgr.validate("app1", "m1").await.unwrap());
    assert!(!mgr.validate("app2", "m1").await.unwrap());
    // The default resolves for every app.
    assert!(mgr.validate("app2", DEFAULT_MODEL_CONFIG_ID).await.unwrap());
}
