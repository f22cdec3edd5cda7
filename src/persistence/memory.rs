//! In-memory config store
//!
//! Suitable for development and testing; data is lost on process exit.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ConfigKey, ConfigRecord, ConfigStore, StoreError, StoreResult};

/// In-memory implementation of [`ConfigStore`]
pub struct InMemoryConfigStore<T> {
    records: RwLock<HashMap<ConfigKey, T>>,
}

impl<T> InMemoryConfigStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for InMemoryConfigStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: ConfigRecord> ConfigStore<T> for InMemoryConfigStore<T> {
    async fn create(&self, record: &T) -> StoreResult<()> {
        let key = record.key();
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: T::KIND,
                key: key.to_string(),
            });
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn get(&self, key: &ConfigKey) -> StoreResult<Option<T>> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn update(&self, record: &T) -> StoreResult<()> {
        let key = record.key();
        let mut records = self.records.write().await;
        match records.get_mut(&key) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind: T::KIND,
                key: key.to_string(),
            }),
        }
    }

    async fn delete(&self, key: &ConfigKey) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records.remove(key);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }
}
