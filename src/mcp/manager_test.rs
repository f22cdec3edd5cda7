use std::sync::Arc;

use crate::error::CoreError;
use crate::persistence::InMemoryConfigStore;

use super::{ConnectionParams, McpConfig, McpManager, McpServerType};

fn manager() -> McpManager {
    McpManager::new(Arc::new(InMemoryConfigStore::new()))
}

fn stdio_config(app: &str, id: &str) -> McpConfig {
    McpConfig {
        mcp_id: id.to_string(),
        app_name: app.to_string(),
        name: format!("{id} server"),
        description: "Filesystem access".to_string(),
        server_type: McpServerType::Stdio,
        command: Some("npx".to_string()),
        args: vec!["-y".to_string(), "@modelcontextprotocol/server-filesystem".to_string()],
        url: None,
        headers: Default::default(),
        env: Default::default(),
        tool_filter: vec![],
        timeout: 30,
        retry_count: 3,
    }
}

fn http_config(app: &str, id: &str) -> McpConfig {
    McpConfig {
        server_type: McpServerType::Http,
        command: None,
        args: vec![],
        url: Some("http://localhost:8090/mcp".to_string()),
        ..stdio_config(app, id)
    }
}

#[tokio::test]
async fn test_stdio_requires_command() {
    let mgr = manager();
    let config = McpConfig {
        command: None,
        ..stdio_config("app", "fs")
    };

    let err = mgr.register_custom(&config).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn test_http_requires_url() {
    let mgr = manager();
    let config = McpConfig {
        url: None,
        ..http_config("app", "web")
    };

    let err = mgr.register_builtin(&config).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn test_builtin_tier_is_immutable() {
    let mgr = manager();
    let config = stdio_config("app", "fs");
    mgr.register_builtin(&config).await.unwrap();

    // Registering the same built-in key twice is a collision.
    let err = mgr.register_builtin(&config).await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists(_)));

    let err = mgr.unregister_builtin("app", "fs").await.unwrap_err();
    assert!(matches!(err, CoreError::NotPermitted(_)));

    // The custom tier never holds a built-in key, so updating it through
    // the custom path fails with NotFound.
    let err = mgr
        .update_custom("app", "fs", &stdio_config("app", "fs"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_unregister_absent_builtin_is_tolerated() {
    let mgr = manager();
    mgr.unregister_builtin("app", "missing").await.unwrap();
}

#[tokio::test]
async fn test_update_custom_missing_key_is_not_found() {
    let mgr = manager();
    let err = mgr
        .update_custom("app", "web", &http_config("app", "web"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_custom_round_trip_restores_state() {
    let mgr = manager();
    let config = http_config("app", "web");

    mgr.register_custom(&config).await.unwrap();
    assert_eq!(mgr.get("app", "web").await.unwrap(), Some(config.clone()));

    let updated = McpConfig {
        url: Some("http://localhost:9000/mcp".to_string()),
        ..config
    };
    mgr.update_custom("app", "web", &updated).await.unwrap();
    assert_eq!(
        mgr.get("app", "web").await.unwrap().unwrap().url.as_deref(),
        Some("http://localhost:9000/mcp")
    );

    mgr.unregister_custom("app", "web").await.unwrap();
    assert!(mgr.get("app", "web").await.unwrap().is_none());
    assert!(mgr.list("app").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_prefers_builtin_tier() {
    let mgr = manager();
    mgr.register_builtin(&stdio_config("app", "fs")).await.unwrap();

    let found = mgr.get("app", "fs").await.unwrap().unwrap();
    assert_eq!(found.server_type, McpServerType::Stdio);
}

#[tokio::test]
async fn test_list_unions_both_tiers_with_global_keys() {
    let mgr = manager();
    mgr.register_builtin(&stdio_config("app", "fs")).await.unwrap();
    mgr.register_custom(&http_config("app", "web")).await.unwrap();
    mgr.register_custom(&http_config("other", "web")).await.unwrap();

    let configs = mgr.list("app").await.unwrap();
    assert_eq!(configs.len(), 2);
    assert!(configs.contains_key("app:fs"));
    assert!(configs.contains_key("app:web"));
}

#[tokio::test]
async fn test_create_toolset_carries_connection_params() {
    let mgr = manager();
    mgr.register_custom(&http_config("app", "web")).await.unwrap();

    let handle = mgr.create_toolset("app", "web").await.unwrap();
    match handle.connection {
        ConnectionParams::Http { ref url, .. } => {
            assert_eq!(url, "http://localhost:8090/mcp");
        }
        ref other => panic!("unexpected connection params: {other:?}"),
    }

    let err = mgr.create_toolset("app", "missing").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}
