use chrono::{NaiveDate, NaiveDateTime};
use practice_core::calendar::MonthCursor;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseInputError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("invalid appointment '{0}', expected YYYY-MM-DDTHH:MM")]
    Appointment(String),

    #[error("invalid month '{0}', expected YYYY-MM")]
    Month(String),
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ParseInputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ParseInputError::Date(s.to_string()))
}

/// Accepts local wall-clock input with or without seconds and returns the
/// canonical stored form `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_appointment(s: &str) -> Result<String, ParseInputError> {
    let trimmed = s.trim();
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .ok_or_else(|| ParseInputError::Appointment(s.to_string()))
}

pub fn parse_month(s: &str) -> Result<MonthCursor, ParseInputError> {
    let err = || ParseInputError::Month(s.to_string());
    let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
    let year = year.parse().map_err(|_| err())?;
    let month = month.parse().map_err(|_| err())?;
    MonthCursor::new(year, month).ok_or_else(err)
}
