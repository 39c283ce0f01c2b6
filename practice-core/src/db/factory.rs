use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::memory::InMemoryStoreFactory;
use super::repository::{SnapshotStore, StoreError};

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DATABASE_FILE: &str = "practice.db";

/// Which snapshot store to open and where.
///
/// Missing fields fall back to [`DbConfig::default`], so a `[db]` table that
/// only names the backend still points at [`DEFAULT_DATABASE_FILE`]. The
/// `memory` backend ignores `connection_string`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl DbConfig {
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: path.into(),
        }
    }

    /// Volatile store; everything is lost when the process exits.
    pub fn in_memory() -> Self {
        Self {
            backend: "memory".to_string(),
            connection_string: String::new(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::sqlite(DEFAULT_DATABASE_FILE)
    }
}

/// Opens one kind of [`SnapshotStore`]. Implementations may create files and
/// run migrations before returning.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// Matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError>;
}

/// Backends known to the running binary, looked up by [`DbConfig::backend`].
#[derive(Default)]
pub struct StoreRegistry {
    factories: BTreeMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that already offers the `memory` backend.
    pub fn with_memory() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(InMemoryStoreFactory));
        registry
    }

    /// Later registrations under the same name win.
    pub fn register(
        &mut self,
        factory: Box<dyn StoreFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Sorted by name.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// # Errors
    /// [`StoreError::Configuration`] for an unregistered backend, otherwise
    /// whatever the backend's factory reports.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(StoreError::Configuration(format!(
                "no storage backend named '{}' (known: {})",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        debug!(backend = %config.backend, "opening snapshot store");
        factory.create(config).await
    }
}
