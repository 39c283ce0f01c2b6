mod booking;
mod customer;
mod database;
mod financial_record;

pub use booking::{Booking, ServiceType};
pub use customer::{Customer, NewCustomer};
pub use database::{Database, Lookup, UNKNOWN_CUSTOMER};
pub use financial_record::{FinancialRecord, PaymentMethod, PaymentStatus};
