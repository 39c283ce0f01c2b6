//! Sample dataset behind the "load demo data" action.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Booking, Customer, Database, FinancialRecord, PaymentMethod, PaymentStatus, ServiceType,
};

pub fn demo_database() -> Database {
    let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap_or_default();
    Database {
        customers: vec![Customer {
            id: "C-001".to_string(),
            name: "Max Mustermann".to_string(),
            email: "max@example.com".to_string(),
            phone: "0123".to_string(),
            address: "Musterstr 1".to_string(),
        }],
        bookings: vec![Booking {
            id: "B-2026-001".to_string(),
            customer_id: "C-001".to_string(),
            external_event_id: "gcal_123".to_string(),
            service_type: ServiceType::OneHourSession,
            appointment_date_time: "2026-01-15T10:00:00".to_string(),
            notes: "Sample note".to_string(),
        }],
        financial_records: vec![FinancialRecord {
            invoice_record_id: "R-001".to_string(),
            booking_id: "B-2026-001".to_string(),
            invoice_number: "INV-2026-001".to_string(),
            gross_amount: Decimal::new(8500, 2),
            invoice_date: day,
            payment_date: Some(day),
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::Cash,
        }],
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn demo_records_are_linked() {
        let db = demo_database();
        let lookup = db.lookup();

        assert_eq!(db.financial_records.len(), 1);
        assert_eq!(db.financial_records[0].gross_amount, dec!(85.00));
        assert_eq!(lookup.customer_name_for_booking("B-2026-001"), "Max Mustermann");
    }
}
