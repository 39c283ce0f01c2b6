use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    Paid,
    Open,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Open => "open",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "paid" => Some(Self::Paid),
            "open" => Some(Self::Open),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Closed two-value set. Adding a variant means extending the per-method
/// breakdowns in [`crate::calculations`], which rely on cash + transfer
/// summing to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bankTransfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "bankTransfer" | "transfer" => Some(Self::BankTransfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub invoice_record_id: String,
    /// Weak reference to a [`Booking`](super::Booking); may dangle.
    pub booking_id: String,
    pub invoice_number: String,
    pub gross_amount: Decimal,
    pub invoice_date: NaiveDate,
    /// Expected to be set only when `payment_status` is `Paid`. Not enforced.
    pub payment_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
}

impl FinancialRecord {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn is_open(&self) -> bool {
        self.payment_status == PaymentStatus::Open
    }
}
