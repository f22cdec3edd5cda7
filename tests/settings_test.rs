//! Bootstrap settings loading tests.

use std::fs;

use hydra::config::{Settings, StorageKind};
use tempfile::TempDir;

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("hydra.toml");

    let toml = r#"
storage = "sql"
database_url = "sqlite://hydra.db"
database_max_connections = 10
default_llm_base_url = "http://localhost:8000/v1"
default_llm_api_key = "sk-test"
default_llm_model = "gpt-4o-mini"
"#;
    fs::write(&path, toml)?;

    let settings = Settings::from_file(path.to_str().unwrap())?;

    assert_eq!(settings.storage, StorageKind::Sql);
    assert_eq!(settings.database_url.as_deref(), Some("sqlite://hydra.db"));
    assert_eq!(settings.database_max_connections, 10);
    assert!(settings.has_default_llm());
    Ok(())
}

#[test]
fn test_missing_file_yields_defaults() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("absent.toml");

    let settings = Settings::from_file(path.to_str().unwrap())?;

    assert_eq!(settings.storage, StorageKind::Memory);
    assert!(settings.database_url.is_none());
    assert!(!settings.has_default_llm());
    Ok(())
}

#[test]
fn test_partial_file_keeps_field_defaults() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("hydra.toml");
    fs::write(&path, "storage = \"memory\"\n")?;

    let settings = Settings::from_file(path.to_str().unwrap())?;

    assert_eq!(settings.storage, StorageKind::Memory);
    assert_eq!(settings.database_max_connections, 5);
    assert_eq!(settings.database_connect_timeout_secs, 30);
    Ok(())
}
