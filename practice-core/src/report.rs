//! Year-end export: figures, ledger and a generated narrative in one
//! immutable value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::calculations::{YearEndReport, compute_year_end_report};
use crate::clock::Clock;
use crate::models::Database;
use crate::views::{LedgerRow, ledger_rows};

/// Narrative used whenever the summarizer fails.
pub const FALLBACK_NARRATIVE: &str = "The AI analysis could not be generated.";
/// Narrative used when the summarizer answers with nothing.
pub const EMPTY_NARRATIVE: &str = "No analysis available.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummarizerError {
    #[error("summarizer is not configured: {0}")]
    NotConfigured(String),

    #[error("summarizer request failed: {0}")]
    Request(String),

    #[error("summarizer response unreadable: {0}")]
    Response(String),

    #[error("summarizer prompt could not be built: {0}")]
    Prompt(String),
}

/// Turns a database snapshot into a short narrative. Best effort; callers
/// must expect failures.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        db: &Database,
        year: i32,
    ) -> Result<String, SummarizerError>;
}

/// A summarizer that always reports itself as unavailable.
#[derive(Debug, Clone, Default)]
pub struct DisabledSummarizer {
    pub reason: String,
}

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(
        &self,
        _db: &Database,
        _year: i32,
    ) -> Result<String, SummarizerError> {
        Err(SummarizerError::NotConfigured(self.reason.clone()))
    }
}

/// Prompt sent to text-generation backends: counts plus the full list of
/// financial records.
pub fn summary_prompt(
    db: &Database,
    year: i32,
) -> Result<String, SummarizerError> {
    let records = serde_json::to_string(&db.financial_records)
        .map_err(|e| SummarizerError::Prompt(e.to_string()))?;
    Ok(format!(
        "Act as the bookkeeping assistant of a small shiatsu practice.\n\
         Analyse the following data:\n\
         Customers: {customers}\n\
         Bookings: {bookings}\n\
         Financial records: {records}\n\n\
         Write a short, professional summary (3-4 sentences) for the {year} year-end closing. \
         Mention the total earnings, the share of cash payments, and whether there are any critical open balances.",
        customers = db.customers.len(),
        bookings = db.bookings.len(),
    ))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("a report export is already running")]
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEndExport {
    pub report: YearEndReport,
    pub ledger: Vec<LedgerRow>,
    pub narrative: String,
    pub generated_on: NaiveDate,
}

pub struct ReportExporter {
    summarizer: Box<dyn Summarizer>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ReportExporter {
    pub fn new(
        summarizer: Box<dyn Summarizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            summarizer,
            clock,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Builds the export for `year`. Summarizer failures never surface here;
    /// they are replaced by [`FALLBACK_NARRATIVE`].
    ///
    /// # Errors
    /// [`ExportError::InProgress`] when another export has not finished yet.
    pub async fn export(
        &self,
        db: &Database,
        year: i32,
    ) -> Result<YearEndExport, ExportError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(ExportError::InProgress);
        }
        let _flight = InFlight(&self.in_flight);

        let report = compute_year_end_report(db, year);
        let ledger = ledger_rows(db);

        let narrative = match self.summarizer.summarize(db, year).await {
            Ok(text) if text.trim().is_empty() => EMPTY_NARRATIVE.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                warn!(%error, "summarizer failed, using fallback narrative");
                FALLBACK_NARRATIVE.to_string()
            }
        };

        info!(year, rows = ledger.len(), "year-end export assembled");

        Ok(YearEndExport {
            report,
            ledger,
            narrative,
            generated_on: self.clock.today(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::clock::FixedClock;
    use crate::demo::demo_database;

    struct CannedSummarizer(&'static str);

    #[async_trait]
    impl Summarizer for CannedSummarizer {
        async fn summarize(
            &self,
            _db: &Database,
            _year: i32,
        ) -> Result<String, SummarizerError> {
            Ok(self.0.to_string())
        }
    }

    struct SlowSummarizer;

    #[async_trait]
    impl Summarizer for SlowSummarizer {
        async fn summarize(
            &self,
            _db: &Database,
            _year: i32,
        ) -> Result<String, SummarizerError> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok("done".to_string())
        }
    }

    fn exporter(summarizer: impl Summarizer + 'static) -> ReportExporter {
        ReportExporter::new(
            Box::new(summarizer),
            Arc::new(FixedClock::at(
                Utc.with_ymd_and_hms(2026, 12, 31, 12, 0, 0).unwrap(),
            )),
        )
    }

    #[tokio::test]
    async fn export_combines_figures_ledger_and_narrative() {
        let db = demo_database();

        let export = exporter(CannedSummarizer(" Solid year. \n"))
            .export(&db, 2026)
            .await
            .unwrap();

        assert_eq!(export.report.gross_total, dec!(85.00));
        assert_eq!(export.report.by_method.cash, dec!(85.00));
        assert_eq!(export.ledger.len(), 1);
        assert_eq!(export.ledger[0].customer_name, "Max Mustermann");
        assert_eq!(export.narrative, "Solid year.");
        let expected_day = FixedClock::at(Utc.with_ymd_and_hms(2026, 12, 31, 12, 0, 0).unwrap()).today();
        assert_eq!(export.generated_on, expected_day);
    }

    #[tokio::test]
    async fn summarizer_failure_uses_fallback() {
        let db = demo_database();

        let export = exporter(DisabledSummarizer {
            reason: "no API key".to_string(),
        })
        .export(&db, 2026)
        .await
        .unwrap();

        assert_eq!(export.narrative, FALLBACK_NARRATIVE);
        assert_eq!(export.report.gross_total, dec!(85.00));
    }

    struct UnbuildablePrompt;

    #[async_trait]
    impl Summarizer for UnbuildablePrompt {
        async fn summarize(
            &self,
            _db: &Database,
            _year: i32,
        ) -> Result<String, SummarizerError> {
            let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            Err(SummarizerError::Prompt(err.to_string()))
        }
    }

    #[tokio::test]
    async fn prompt_failure_uses_fallback() {
        let export = exporter(UnbuildablePrompt)
            .export(&demo_database(), 2026)
            .await
            .unwrap();

        assert_eq!(export.narrative, FALLBACK_NARRATIVE);
    }

    #[test]
    fn prompt_failure_is_not_reported_as_a_request_failure() {
        let err = SummarizerError::Prompt("key must be a string".to_string());

        assert_eq!(
            err.to_string(),
            "summarizer prompt could not be built: key must be a string"
        );
    }

    #[tokio::test]
    async fn empty_answer_uses_placeholder() {
        let export = exporter(CannedSummarizer("   "))
            .export(&Database::default(), 2026)
            .await
            .unwrap();

        assert_eq!(export.narrative, EMPTY_NARRATIVE);
    }

    #[tokio::test]
    async fn export_leaves_database_untouched() {
        let db = demo_database();
        let before = db.clone();

        exporter(CannedSummarizer("ok")).export(&db, 2026).await.unwrap();

        assert_eq!(db, before);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_export_is_rejected() {
        let exporter = exporter(SlowSummarizer);
        let db = Database::default();

        let (first, second) = tokio::join!(exporter.export(&db, 2026), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            exporter.export(&db, 2026).await
        });

        assert_eq!(first.map(|e| e.narrative), Ok("done".to_string()));
        assert_eq!(second, Err(ExportError::InProgress));
        assert!(exporter.export(&db, 2026).await.is_ok());
    }

    #[test]
    fn prompt_mentions_counts_and_records() {
        let prompt = summary_prompt(&demo_database(), 2026).unwrap();

        assert!(prompt.contains("Customers: 1"));
        assert!(prompt.contains("Bookings: 1"));
        assert!(prompt.contains("INV-2026-001"));
        assert!(prompt.contains("2026 year-end"));
    }
}
