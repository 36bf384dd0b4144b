use async_trait::async_trait;
use thiserror::Error;

use crate::models::ClientData;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Key/value persistence for the single client record.
#[async_trait]
pub trait ClientDataStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<ClientData>, StoreError>;

    /// Insert or replace the record under `key`.
    async fn save(&self, key: &str, data: &ClientData) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}
