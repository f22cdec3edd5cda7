//! Typed config persistence
//!
//! One [`ConfigStore`] per config kind (model, agent, MCP), keyed by
//! `(app_name, record_id)`. Two implementations: a process-lifetime
//! in-memory map and a SQL-backed store with one JSON-value table per kind.

mod database;
mod memory;

pub use database::{open_pool, SqlConfigStore};
pub use memory::InMemoryConfigStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by config stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key absent on update
    #[error("{kind} not found: '{key}'")]
    NotFound { kind: &'static str, key: String },

    /// Key already present on create
    #[error("{kind} already exists: '{key}'")]
    AlreadyExists { kind: &'static str, key: String },

    /// Database connection error
    #[error("database connection error: {0}")]
    Connection(String),

    /// Database error from SQLx
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Composite key of a stored config record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub app_name: String,
    pub record_id: String,
}

impl ConfigKey {
    pub fn new(app_name: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            record_id: record_id.into(),
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.app_name, self.record_id)
    }
}

/// A config record that can live in a [`ConfigStore`].
pub trait ConfigRecord:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Table name / diagnostic label of the record kind
    const KIND: &'static str;

    fn app_name(&self) -> &str;

    fn record_id(&self) -> &str;

    fn key(&self) -> ConfigKey {
        ConfigKey::new(self.app_name(), self.record_id())
    }
}

/// CRUD over one kind of config record.
///
/// Operations are serialized per key; cross-store transactions are not
/// offered. `delete` is idempotent.
#[async_trait]
pub trait ConfigStore<T: ConfigRecord>: Send + Sync {
    /// Store a new record; fails with `AlreadyExists` when the key is taken.
    async fn create(&self, record: &T) -> StoreResult<()>;

    async fn get(&self, key: &ConfigKey) -> StoreResult<Option<T>>;

    /// Replace an existing record; fails with `NotFound` when absent.
    async fn update(&self, record: &T) -> StoreResult<()>;

    async fn delete(&self, key: &ConfigKey) -> StoreResult<()>;

    async fn list(&self) -> StoreResult<Vec<T>>;
}
