use async_trait::async_trait;

use practice_core::db::{DbConfig, SnapshotStore, StoreError, StoreFactory};

use crate::repository::SqliteSnapshotStore;

/// Opens the `sqlite` backend. The connection string is a file path, created
/// on first use, or `:memory:`.
///
/// ```rust,no_run
/// use practice_core::db::StoreRegistry;
/// use practice_db_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::with_memory();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Migrations run before the store is handed out.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        let store = SqliteSnapshotStore::new(&config.connection_string).await?;
        store.run_migrations().await?;
        Ok(Box::new(store))
    }
}
