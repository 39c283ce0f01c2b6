//! Shared helpers for the financial aggregations.
//!
//! Sums are accumulated exactly in [`Decimal`]; rounding to cents happens
//! only when a value is displayed.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Database, FinancialRecord, Lookup, PaymentMethod};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use practice_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount for display: two decimals, then the currency symbol.
///
/// ```
/// use rust_decimal_macros::dec;
/// use practice_core::calculations::common::format_money;
///
/// assert_eq!(format_money(dec!(85), "€"), "85.00 €");
/// assert_eq!(format_money(dec!(0.005), "€"), "0.01 €");
/// ```
pub fn format_money(
    value: Decimal,
    currency_symbol: &str,
) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    if currency_symbol.is_empty() {
        rounded.to_string()
    } else {
        format!("{rounded} {currency_symbol}")
    }
}

/// Gross amounts split by payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub cash: Decimal,
    pub bank_transfer: Decimal,
}

impl MethodBreakdown {
    pub fn add(
        &mut self,
        method: PaymentMethod,
        amount: Decimal,
    ) {
        match method {
            PaymentMethod::Cash => self.cash += amount,
            PaymentMethod::BankTransfer => self.bank_transfer += amount,
        }
    }

    pub fn total(&self) -> Decimal {
        self.cash + self.bank_transfer
    }
}

/// Paid records whose booking's appointment falls in `year`.
///
/// Records with a dangling booking reference, or whose booking date cannot be
/// read, fail the join and are skipped.
pub fn paid_in_year<'a>(
    db: &'a Database,
    lookup: &'a Lookup<'a>,
    year: i32,
) -> impl Iterator<Item = &'a FinancialRecord> + 'a {
    db.financial_records.iter().filter(move |record| {
        record.is_paid()
            && lookup
                .booking(&record.booking_id)
                .and_then(|booking| booking.local_date())
                .is_some_and(|date| date.year() == year)
    })
}
