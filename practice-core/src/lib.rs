pub mod calculations;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod db;
pub mod demo;
pub mod models;
pub mod report;
pub mod store;
pub mod sync;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PracticeConfig;
pub use db::{SnapshotStore, StoreError};
pub use models::*;
pub use store::RecordStore;
