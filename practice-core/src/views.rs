//! Joined, display-ready projections of the record collections.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Booking, Database, PaymentMethod, PaymentStatus, ServiceType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRow {
    pub booking_id: String,
    pub customer_name: String,
    pub service_type: ServiceType,
    pub appointment_date_time: String,
    pub notes: String,
    /// Status of the first financial record for the booking; `Open` when
    /// there is none.
    pub payment_status: PaymentStatus,
    pub imported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub invoice_number: String,
    pub payment_date: Option<NaiveDate>,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub gross_amount: Decimal,
}

impl LedgerRow {
    /// Payment date as `YYYY-MM-DD`, or `-` when unpaid.
    pub fn payment_date_label(&self) -> String {
        self.payment_date
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
    }
}

/// Every booking in insertion order, joined with its customer and payment.
pub fn booking_rows(
    db: &Database,
    import_prefix: &str,
) -> Vec<BookingRow> {
    let lookup = db.lookup();
    db.bookings
        .iter()
        .map(|b| BookingRow {
            booking_id: b.id.clone(),
            customer_name: lookup.customer_name(&b.customer_id).to_string(),
            service_type: b.service_type,
            appointment_date_time: b.appointment_date_time.clone(),
            notes: b.notes.clone(),
            payment_status: lookup
                .record_for_booking(&b.id)
                .map_or(PaymentStatus::Open, |r| r.payment_status),
            imported: b.has_external_prefix(import_prefix),
        })
        .collect()
}

/// The last `n` bookings, newest first.
pub fn recent_bookings(
    db: &Database,
    n: usize,
) -> Vec<(&Booking, &str)> {
    let lookup = db.lookup();
    db.bookings
        .iter()
        .rev()
        .take(n)
        .map(|b| (b, lookup.customer_name(&b.customer_id)))
        .collect()
}

/// Every financial record in insertion order, joined through its booking to
/// the customer.
pub fn ledger_rows(db: &Database) -> Vec<LedgerRow> {
    let lookup = db.lookup();
    db.financial_records
        .iter()
        .map(|r| LedgerRow {
            invoice_number: r.invoice_number.clone(),
            payment_date: r.payment_date,
            customer_name: lookup.customer_name_for_booking(&r.booking_id).to_string(),
            payment_method: r.payment_method,
            payment_status: r.payment_status,
            gross_amount: r.gross_amount,
        })
        .collect()
}
