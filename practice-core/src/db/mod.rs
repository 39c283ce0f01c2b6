pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DEFAULT_DATABASE_FILE, DbConfig, StoreFactory, StoreRegistry};
pub use memory::{InMemoryStore, InMemoryStoreFactory};
pub use repository::{SnapshotStore, StoreError};
