//! Year-end financial summary.
//!
//! The figures deliberately use three different scopes:
//!
//! | Figure            | Scope                                         |
//! |-------------------|-----------------------------------------------|
//! | `gross_total`     | paid records whose booking falls in the year  |
//! | `by_method`       | same as `gross_total`, split by method        |
//! | `treatment_count` | every booking, any year, any payment status   |
//! | `open_amount`     | every open record, any year                   |
//!
//! `treatment_count` is therefore broader than the dashboard's paid-only,
//! in-year count.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{MethodBreakdown, paid_in_year};
use crate::models::Database;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEndReport {
    pub year: i32,
    pub gross_total: Decimal,
    pub by_method: MethodBreakdown,
    pub treatment_count: usize,
    pub open_amount: Decimal,
}

pub fn compute_year_end_report(
    db: &Database,
    year: i32,
) -> YearEndReport {
    let lookup = db.lookup();

    let mut by_method = MethodBreakdown::default();
    for record in paid_in_year(db, &lookup, year) {
        by_method.add(record.payment_method, record.gross_amount);
    }

    let open_amount = db
        .financial_records
        .iter()
        .filter(|r| r.is_open())
        .map(|r| r.gross_amount)
        .sum();

    debug!(year, "year-end report recomputed");

    YearEndReport {
        year,
        gross_total: by_method.total(),
        by_method,
        treatment_count: db.bookings.len(),
        open_amount,
    }
}
