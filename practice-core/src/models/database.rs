use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Booking, Customer, FinancialRecord};

/// Label rendered wherever a customer reference cannot be resolved.
pub const UNKNOWN_CUSTOMER: &str = "Unknown customer";

/// The aggregate root: three ordered collections, persisted as one snapshot.
///
/// Insertion order is meaningful ("most recent N" views read from the end).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub financial_records: Vec<FinancialRecord>,
}

impl Database {
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty() && self.bookings.is_empty() && self.financial_records.is_empty()
    }

    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores a snapshot. Absent or unreadable payloads yield an empty
    /// database.
    pub fn from_snapshot(payload: Option<&str>) -> Self {
        let Some(payload) = payload else {
            return Self::default();
        };
        match serde_json::from_str(payload) {
            Ok(db) => db,
            Err(error) => {
                warn!(%error, "discarding unreadable snapshot");
                Self::default()
            }
        }
    }

    /// Builds id lookups for joins. First occurrence wins on duplicate ids.
    pub fn lookup(&self) -> Lookup<'_> {
        let mut customers = HashMap::with_capacity(self.customers.len());
        for c in &self.customers {
            customers.entry(c.id.as_str()).or_insert(c);
        }
        let mut bookings = HashMap::with_capacity(self.bookings.len());
        for b in &self.bookings {
            bookings.entry(b.id.as_str()).or_insert(b);
        }
        let mut records_by_booking = HashMap::with_capacity(self.financial_records.len());
        for r in &self.financial_records {
            records_by_booking.entry(r.booking_id.as_str()).or_insert(r);
        }
        Lookup {
            customers,
            bookings,
            records_by_booking,
        }
    }
}

/// Borrowed id indexes over a [`Database`].
pub struct Lookup<'a> {
    customers: HashMap<&'a str, &'a Customer>,
    bookings: HashMap<&'a str, &'a Booking>,
    records_by_booking: HashMap<&'a str, &'a FinancialRecord>,
}

impl<'a> Lookup<'a> {
    pub fn customer(
        &self,
        id: &str,
    ) -> Option<&'a Customer> {
        self.customers.get(id).copied()
    }

    pub fn booking(
        &self,
        id: &str,
    ) -> Option<&'a Booking> {
        self.bookings.get(id).copied()
    }

    pub fn record_for_booking(
        &self,
        booking_id: &str,
    ) -> Option<&'a FinancialRecord> {
        self.records_by_booking.get(booking_id).copied()
    }

    /// Customer name, or [`UNKNOWN_CUSTOMER`] for a dangling reference.
    pub fn customer_name(
        &self,
        id: &str,
    ) -> &'a str {
        self.customer(id).map_or(UNKNOWN_CUSTOMER, |c| c.name.as_str())
    }

    /// Name of the customer behind a financial record's booking.
    pub fn customer_name_for_booking(
        &self,
        booking_id: &str,
    ) -> &'a str {
        self.booking(booking_id)
            .map_or(UNKNOWN_CUSTOMER, |b| self.customer_name(&b.customer_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{PaymentMethod, PaymentStatus, ServiceType};

    fn sample() -> Database {
        Database {
            customers: vec![Customer {
                id: "C-1".to_string(),
                name: "Maria Schmidt".to_string(),
                email: "maria@example.com".to_string(),
                phone: String::new(),
                address: String::new(),
            }],
            bookings: vec![
                Booking {
                    id: "B-1".to_string(),
                    customer_id: "C-1".to_string(),
                    external_event_id: "evt_1".to_string(),
                    service_type: ServiceType::OneHourSession,
                    appointment_date_time: "2026-01-15T10:00:00".to_string(),
                    notes: "first visit".to_string(),
                },
                Booking {
                    id: "B-2".to_string(),
                    customer_id: "C-404".to_string(),
                    external_event_id: "gcal_auto_2".to_string(),
                    service_type: ServiceType::SixHourIntensive,
                    appointment_date_time: "2026-01-16T09:00:00Z".to_string(),
                    notes: String::new(),
                },
            ],
            financial_records: vec![FinancialRecord {
                invoice_record_id: "R-1".to_string(),
                booking_id: "B-1".to_string(),
                invoice_number: "INV-2026-001".to_string(),
                gross_amount: dec!(85.00),
                invoice_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                payment_date: NaiveDate::from_ymd_opt(2026, 1, 15),
                payment_status: PaymentStatus::Paid,
                payment_method: PaymentMethod::Cash,
            }],
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_everything() {
        let db = sample();

        let restored = Database::from_snapshot(Some(&db.to_snapshot().unwrap()));

        assert_eq!(restored, db);
    }

    #[test]
    fn missing_snapshot_is_empty_database() {
        assert_eq!(Database::from_snapshot(None), Database::default());
    }

    #[test]
    fn invalid_snapshot_fails_closed() {
        assert!(Database::from_snapshot(Some("{not json")).is_empty());
        assert!(Database::from_snapshot(Some(r#"{"customers": 12}"#)).is_empty());
    }

    #[test]
    fn partial_snapshot_defaults_missing_collections() {
        let db = Database::from_snapshot(Some(r#"{"customers": []}"#));

        assert!(db.is_empty());
    }

    #[test]
    fn lookup_resolves_and_tolerates_dangling_references() {
        let db = sample();
        let lookup = db.lookup();

        assert_eq!(lookup.customer_name("C-1"), "Maria Schmidt");
        assert_eq!(lookup.customer_name("C-404"), UNKNOWN_CUSTOMER);
        assert_eq!(lookup.customer_name_for_booking("B-1"), "Maria Schmidt");
        assert_eq!(lookup.customer_name_for_booking("B-2"), UNKNOWN_CUSTOMER);
        assert_eq!(lookup.customer_name_for_booking("B-missing"), UNKNOWN_CUSTOMER);
        assert!(lookup.record_for_booking("B-2").is_none());
    }

    #[test]
    fn lookup_prefers_first_duplicate() {
        let mut db = sample();
        let mut duplicate = db.customers[0].clone();
        duplicate.name = "Shadow".to_string();
        db.customers.push(duplicate);

        assert_eq!(db.lookup().customer_name("C-1"), "Maria Schmidt");
    }
}
