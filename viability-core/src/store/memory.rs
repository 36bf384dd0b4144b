use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::factory::{StoreConfig, StoreFactory};
use super::repository::{ClientDataStore, StoreError};
use crate::models::ClientData;

/// Process-local store; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, ClientData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientDataStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<ClientData>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, data: &ClientData) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(key.to_string(), data.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }
}

/// Registers as `"memory"`; the connection string is ignored.
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &StoreConfig) -> Result<Box<dyn ClientDataStore>, StoreError> {
        Ok(Box::new(MemoryStore::new()))
    }
}
