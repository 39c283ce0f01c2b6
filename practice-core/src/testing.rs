//! Builders shared by the unit tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Booking, Customer, Database, FinancialRecord, PaymentMethod, PaymentStatus, ServiceType,
};

pub fn customer(
    id: &str,
    name: &str,
) -> Customer {
    Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: String::new(),
        phone: String::new(),
        address: String::new(),
    }
}

pub fn booking(
    id: &str,
    customer_id: &str,
    when: &str,
) -> Booking {
    Booking {
        id: id.to_string(),
        customer_id: customer_id.to_string(),
        external_event_id: format!("evt_{id}"),
        service_type: ServiceType::OneHourSession,
        appointment_date_time: when.to_string(),
        notes: String::new(),
    }
}

pub fn record(
    id: &str,
    booking_id: &str,
    amount: Decimal,
    status: PaymentStatus,
    method: PaymentMethod,
) -> FinancialRecord {
    let invoice_date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    FinancialRecord {
        invoice_record_id: id.to_string(),
        booking_id: booking_id.to_string(),
        invoice_number: format!("INV-{id}"),
        gross_amount: amount,
        invoice_date,
        payment_date: (status == PaymentStatus::Paid).then_some(invoice_date),
        payment_status: status,
        payment_method: method,
    }
}

pub fn database(
    customers: Vec<Customer>,
    bookings: Vec<Booking>,
    financial_records: Vec<FinancialRecord>,
) -> Database {
    Database {
        customers,
        bookings,
        financial_records,
    }
}
