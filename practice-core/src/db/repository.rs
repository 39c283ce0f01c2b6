use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// A durable key-value slot holding opaque serialized snapshots.
///
/// Implementations overwrite the whole value on every `save`; there is no
/// partial update.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns `None` when nothing has been saved under `key` yet.
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError>;

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), StoreError>;
}
