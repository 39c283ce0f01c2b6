//! Application state shared by every command.
//!
//! Holds the record store behind an async mutex together with the two
//! long-lived collaborators that guard their own in-flight actions.

use std::sync::Arc;

use anyhow::Context;
use practice_core::clock::{Clock, SystemClock};
use practice_core::db::StoreRegistry;
use practice_core::report::{ExportError, ReportExporter, Summarizer, YearEndExport};
use practice_core::sync::{
    CalendarSync, ConfirmationGate, SimulatedCalendarSource, SyncError, SyncOutcome, TokioDelay,
};
use practice_core::{Database, PracticeConfig, RecordStore, StoreError};
use tokio::sync::Mutex;
use tracing::debug;

use crate::settings::Settings;
use crate::summarizer;

pub struct AppState {
    pub config: PracticeConfig,
    store: Mutex<RecordStore>,
    sync: CalendarSync,
    exporter: ReportExporter,
}

impl AppState {
    pub fn new(
        config: PracticeConfig,
        store: RecordStore,
        sync: CalendarSync,
        summarizer: Box<dyn Summarizer>,
    ) -> Self {
        let exporter = ReportExporter::new(summarizer, Arc::clone(store.clock()));
        Self {
            config,
            store: Mutex::new(store),
            sync,
            exporter,
        }
    }

    /// Opens the configured backend and wires the production collaborators.
    pub async fn open(
        settings: &Settings,
        registry: &StoreRegistry,
    ) -> anyhow::Result<Self> {
        debug!(backend = %settings.db.backend, "opening storage");
        let storage = registry
            .create(&settings.db)
            .await
            .with_context(|| format!("cannot open {} storage", settings.db.backend))?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let now = clock.now();
        let store = RecordStore::open(storage, settings.practice.storage_key.clone(), clock)
            .await
            .context("cannot read the stored database")?;

        let sync = CalendarSync::new(
            &settings.practice,
            Box::new(SimulatedCalendarSource::new(now)),
            Box::new(TokioDelay),
        );

        Ok(Self::new(
            settings.practice.clone(),
            store,
            sync,
            summarizer::from_config(&settings.summarizer),
        ))
    }

    pub fn store(&self) -> &Mutex<RecordStore> {
        &self.store
    }

    /// A copy of the current database, detached from the store lock.
    pub async fn snapshot(&self) -> Database {
        self.store.lock().await.database().clone()
    }

    pub async fn connect(
        &self,
        gate: &dyn ConfirmationGate,
    ) -> Result<SyncOutcome, SyncError> {
        self.sync.connect(&self.store, gate).await
    }

    pub fn sync(&self) -> &CalendarSync {
        &self.sync
    }

    pub async fn export_year(
        &self,
        year: i32,
    ) -> Result<YearEndExport, ExportError> {
        let db = self.snapshot().await;
        self.exporter.export(&db, year).await
    }

    /// Empties the database and drops the calendar connection.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.lock().await.reset().await?;
        self.sync.reset();
        Ok(())
    }
}
