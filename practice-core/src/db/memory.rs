use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::factory::{DbConfig, StoreFactory};
use super::repository::{SnapshotStore, StoreError};

/// Process-local [`SnapshotStore`]. Clones share the same slots, which lets
/// tests reopen a store and observe what an earlier instance persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot directly, bypassing the record store.
    pub fn with_payload(
        key: &str,
        payload: &str,
    ) -> Self {
        let store = Self::new();
        store.put(key, payload);
        store
    }

    /// Raw read of a slot.
    pub fn get(
        &self,
        key: &str,
    ) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(
        &self,
        key: &str,
        payload: &str,
    ) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), payload.to_string());
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), StoreError> {
        self.put(key, payload);
        Ok(())
    }
}

/// [`StoreFactory`] for the `"memory"` backend. The connection string is
/// ignored; every `create` call yields a fresh, empty store.
pub struct InMemoryStoreFactory;

#[async_trait]
impl StoreFactory for InMemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        Ok(Box::new(InMemoryStore::new()))
    }
}
