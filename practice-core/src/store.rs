//! The record store: single source of truth for customers, bookings and
//! financial records.
//!
//! Every mutation is write-through. The next snapshot is built aside,
//! persisted, and only then becomes visible; a failed save leaves the store
//! exactly as it was.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::{Clock, IdGenerator};
use crate::db::{SnapshotStore, StoreError};
use crate::demo::demo_database;
use crate::models::{Booking, Customer, Database, FinancialRecord, NewCustomer};

pub struct RecordStore {
    storage: Box<dyn SnapshotStore>,
    key: String,
    db: Database,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
}

impl RecordStore {
    /// Restores the snapshot under `key`.
    ///
    /// A missing or unreadable snapshot opens as an empty database. A failure
    /// of the storage itself is returned as an error.
    pub async fn open(
        storage: Box<dyn SnapshotStore>,
        key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let key = key.into();
        let payload = storage.load(&key).await?;
        let db = Database::from_snapshot(payload.as_deref());
        debug!(
            key = %key,
            customers = db.customers.len(),
            bookings = db.bookings.len(),
            financial_records = db.financial_records.len(),
            "record store opened"
        );
        Ok(Self {
            storage,
            key,
            db,
            clock,
            ids: IdGenerator::default(),
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn list_customers(&self) -> &[Customer] {
        &self.db.customers
    }

    pub fn list_bookings(&self) -> &[Booking] {
        &self.db.bookings
    }

    pub fn list_financial_records(&self) -> &[FinancialRecord] {
        &self.db.financial_records
    }

    /// Appends a customer under a freshly generated id.
    ///
    /// The caller guarantees a non-empty name.
    pub async fn add_customer(
        &mut self,
        fields: NewCustomer,
    ) -> Result<Customer, StoreError> {
        let customer = fields.into_customer(self.next_id("C-"));
        let mut next = self.db.clone();
        next.customers.push(customer.clone());
        self.commit(next).await?;
        info!(id = %customer.id, "customer added");
        Ok(customer)
    }

    /// Appends a booking as given. The customer reference is not checked.
    pub async fn add_booking(
        &mut self,
        booking: Booking,
    ) -> Result<(), StoreError> {
        let id = booking.id.clone();
        let mut next = self.db.clone();
        next.bookings.push(booking);
        self.commit(next).await?;
        info!(id = %id, "booking added");
        Ok(())
    }

    /// Appends a financial record as given. The booking reference is not
    /// checked.
    pub async fn add_financial_record(
        &mut self,
        record: FinancialRecord,
    ) -> Result<(), StoreError> {
        let id = record.invoice_record_id.clone();
        let mut next = self.db.clone();
        next.financial_records.push(record);
        self.commit(next).await?;
        info!(id = %id, "financial record added");
        Ok(())
    }

    /// Overwrites all three collections at once.
    pub async fn replace(
        &mut self,
        db: Database,
    ) -> Result<(), StoreError> {
        self.commit(db).await?;
        info!("database replaced");
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.replace(Database::default()).await
    }

    pub async fn load_demo(&mut self) -> Result<(), StoreError> {
        self.replace(demo_database()).await
    }

    /// A timestamp-derived id that collides with no id currently stored.
    pub fn next_id(
        &mut self,
        prefix: &str,
    ) -> String {
        let taken: HashSet<&str> = self
            .db
            .customers
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.db.bookings.iter().map(|b| b.id.as_str()))
            .chain(self.db.bookings.iter().map(|b| b.external_event_id.as_str()))
            .chain(
                self.db
                    .financial_records
                    .iter()
                    .map(|r| r.invoice_record_id.as_str()),
            )
            .collect();
        loop {
            let id = self.ids.next(prefix, self.clock.now());
            if !taken.contains(id.as_str()) {
                return id;
            }
        }
    }

    async fn commit(
        &mut self,
        next: Database,
    ) -> Result<(), StoreError> {
        let payload = next.to_snapshot()?;
        self.storage.save(&self.key, &payload).await?;
        self.db = next;
        Ok(())
    }
}
