//! Headline figures for the overview screen.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{MethodBreakdown, paid_in_year};
use crate::models::Database;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub year: i32,
    /// Paid gross for bookings in `year`.
    pub total_earnings: Decimal,
    pub cash_earnings: Decimal,
    pub transfer_earnings: Decimal,
    /// Number of paid records behind `total_earnings`, not the number of
    /// bookings.
    pub treatment_count: usize,
    pub total_customers: usize,
    /// Open invoices across all years.
    pub open_invoices_count: usize,
}

pub fn compute_dashboard_stats(
    db: &Database,
    year: i32,
) -> DashboardStats {
    let lookup = db.lookup();

    let mut breakdown = MethodBreakdown::default();
    let mut treatment_count = 0;
    for record in paid_in_year(db, &lookup, year) {
        breakdown.add(record.payment_method, record.gross_amount);
        treatment_count += 1;
    }

    let open_invoices_count = db.financial_records.iter().filter(|r| r.is_open()).count();

    debug!(year, treatment_count, open_invoices_count, "dashboard recomputed");

    DashboardStats {
        year,
        total_earnings: breakdown.total(),
        cash_earnings: breakdown.cash,
        transfer_earnings: breakdown.bank_transfer,
        treatment_count,
        total_customers: db.customers.len(),
        open_invoices_count,
    }
}
