//! CSV export of the year-end ledger.
//!
//! Columns, in order:
//!
//! | Column           | Notes                                  |
//! |------------------|----------------------------------------|
//! | `payment_date`   | `YYYY-MM-DD`, or `-` when unpaid       |
//! | `invoice_number` |                                        |
//! | `customer`       | `Unknown customer` on a dangling link  |
//! | `method`         | `cash` or `bankTransfer`               |
//! | `status`         | `paid`, `open` or `cancelled`          |
//! | `gross_amount`   | two decimals, no currency symbol       |

use std::io::Write;
use std::path::Path;

use practice_core::calculations::format_money;
use practice_core::views::LedgerRow;
use serde::Serialize;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum LedgerExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    payment_date: String,
    invoice_number: &'a str,
    customer: &'a str,
    method: &'static str,
    status: &'static str,
    gross_amount: String,
}

impl<'a> From<&'a LedgerRow> for CsvRow<'a> {
    fn from(row: &'a LedgerRow) -> Self {
        Self {
            payment_date: row.payment_date_label(),
            invoice_number: &row.invoice_number,
            customer: &row.customer_name,
            method: row.payment_method.as_str(),
            status: row.payment_status.as_str(),
            gross_amount: format_money(row.gross_amount, ""),
        }
    }
}

/// Writes `rows` with a header line, in the given order.
pub fn write_ledger<W: Write>(
    writer: W,
    rows: &[LedgerRow],
) -> Result<(), LedgerExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    if rows.is_empty() {
        writer.write_record([
            "payment_date",
            "invoice_number",
            "customer",
            "method",
            "status",
            "gross_amount",
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Creates or truncates `path` and writes the ledger into it.
pub fn write_ledger_file(
    path: &Path,
    rows: &[LedgerRow],
) -> Result<(), LedgerExportError> {
    let file = std::fs::File::create(path).map_err(|source| LedgerExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_ledger(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "ledger exported");
    Ok(())
}
