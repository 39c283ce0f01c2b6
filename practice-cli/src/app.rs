//! Command dispatch: one handler per subcommand, each returning the text to
//! print.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::Datelike;
use clap::Subcommand;
use practice_core::calculations::compute_dashboard_stats;
use practice_core::calendar::{MonthCursor, project_month};
use practice_core::db::StoreRegistry;
use practice_core::sync::ConfirmationGate;
use practice_core::views::{booking_rows, recent_bookings};
use practice_core::{
    Booking, FinancialRecord, NewCustomer, PaymentMethod, PaymentStatus, ServiceType,
};
use practice_db_sqlite::SqliteStoreFactory;
use tracing::{info, warn};

use crate::state::AppState;
use crate::utils::{parse_appointment, parse_date, parse_decimal, parse_month};
use crate::{csv_export, render};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a new customer.
    AddCustomer {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Record an appointment for an existing customer.
    AddBooking {
        #[arg(long)]
        customer: String,
        /// Local start time, e.g. `2026-01-15T10:00`.
        #[arg(long)]
        at: String,
        /// `1h` or `6h`.
        #[arg(long, default_value = "1h")]
        service: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Record an invoice for a booking.
    AddInvoice {
        #[arg(long)]
        booking: String,
        #[arg(long)]
        amount: String,
        /// `cash` or `transfer`.
        #[arg(long, default_value = "cash")]
        method: String,
        /// `paid`, `open` or `cancelled`.
        #[arg(long, default_value = "paid")]
        status: String,
        /// Generated as `INV-<year>-<nnn>` when omitted.
        #[arg(long)]
        number: Option<String>,
        /// Defaults to today.
        #[arg(long)]
        invoice_date: Option<String>,
        /// Defaults to the invoice date; ignored unless the invoice is paid.
        #[arg(long)]
        paid_on: Option<String>,
    },
    /// List customers.
    Customers,
    /// List bookings with customer and payment status.
    Bookings,
    /// Earnings overview and the most recent bookings.
    Dashboard {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Month grid of bookings.
    Calendar {
        /// `YYYY-MM`, defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },
    /// Connect the external calendar and import a matching appointment.
    Connect,
    /// Year-end report with ledger and generated analysis.
    Report {
        #[arg(long)]
        year: Option<i32>,
        /// Also write the ledger as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Replace all data with the demo dataset.
    Demo,
    /// Delete all customers, bookings and invoices.
    Reset,
}

/// Every storage backend this binary knows about.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::with_memory();
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Asks on stdout and reads one line from stdin. Anything but `y`/`yes`
/// declines, as does a read failure.
pub fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub async fn run(
    state: &AppState,
    command: Command,
    gate: &dyn ConfirmationGate,
) -> anyhow::Result<String> {
    let today = state.store().lock().await.clock().today();

    match command {
        Command::AddCustomer {
            name,
            email,
            phone,
            address,
        } => {
            if name.trim().is_empty() {
                bail!("customer name must not be empty");
            }
            let customer = state
                .store()
                .lock()
                .await
                .add_customer(NewCustomer {
                    name: name.trim().to_string(),
                    email,
                    phone,
                    address,
                })
                .await
                .context("cannot save customer")?;
            Ok(format!("Added customer {} ({}).\n", customer.name, customer.id))
        }

        Command::AddBooking {
            customer,
            at,
            service,
            notes,
        } => {
            let appointment_date_time = parse_appointment(&at)?;
            let Some(service_type) = ServiceType::parse(&service) else {
                bail!("unknown service '{service}', expected 1h or 6h");
            };
            let mut store = state.store().lock().await;
            if !store.list_customers().iter().any(|c| c.id == customer) {
                bail!("no customer with id '{customer}'");
            }
            let booking = Booking {
                id: store.next_id("B-"),
                customer_id: customer,
                external_event_id: store.next_id("evt_"),
                service_type,
                appointment_date_time,
                notes,
            };
            let id = booking.id.clone();
            store.add_booking(booking).await.context("cannot save booking")?;
            Ok(format!("Added booking {id}.\n"))
        }

        Command::AddInvoice {
            booking,
            amount,
            method,
            status,
            number,
            invoice_date,
            paid_on,
        } => {
            let gross_amount = parse_decimal(&amount)?;
            if gross_amount.is_sign_negative() {
                bail!("amount must not be negative, got {amount}");
            }
            let Some(payment_method) = PaymentMethod::parse(&method) else {
                bail!("unknown payment method '{method}', expected cash or transfer");
            };
            let Some(payment_status) = PaymentStatus::parse(&status) else {
                bail!("unknown payment status '{status}', expected paid, open or cancelled");
            };
            let invoice_date = invoice_date
                .as_deref()
                .map(parse_date)
                .transpose()?
                .unwrap_or(today);
            let payment_date = match (payment_status, paid_on.as_deref()) {
                (PaymentStatus::Paid, Some(raw)) => Some(parse_date(raw)?),
                (PaymentStatus::Paid, None) => Some(invoice_date),
                _ => None,
            };

            let mut store = state.store().lock().await;
            if !store.list_bookings().iter().any(|b| b.id == booking) {
                warn!(booking = %booking, "invoice references an unknown booking");
            }
            let invoice_number = number.unwrap_or_else(|| {
                format!(
                    "INV-{}-{:03}",
                    invoice_date.year(),
                    store.list_financial_records().len() + 1
                )
            });
            let record = FinancialRecord {
                invoice_record_id: store.next_id("R-"),
                booking_id: booking,
                invoice_number: invoice_number.clone(),
                gross_amount,
                invoice_date,
                payment_date,
                payment_status,
                payment_method,
            };
            store
                .add_financial_record(record)
                .await
                .context("cannot save invoice")?;
            Ok(format!("Added invoice {invoice_number}.\n"))
        }

        Command::Customers => {
            let db = state.snapshot().await;
            Ok(render::customers(&db.customers))
        }

        Command::Bookings => {
            let db = state.snapshot().await;
            Ok(render::bookings(&booking_rows(&db, &state.config.import_prefix)))
        }

        Command::Dashboard { year } => {
            let db = state.snapshot().await;
            let stats = compute_dashboard_stats(&db, year.unwrap_or(today.year()));
            let recent = recent_bookings(&db, state.config.recent_bookings);
            Ok(render::dashboard(&stats, &recent, &state.config.currency_symbol))
        }

        Command::Calendar { month } => {
            let cursor = match month {
                Some(raw) => parse_month(&raw)?,
                None => MonthCursor::containing(today),
            };
            let db = state.snapshot().await;
            Ok(render::calendar(&project_month(&db, cursor, today)))
        }

        Command::Connect => {
            let outcome = state
                .connect(gate)
                .await
                .context("calendar connection failed")?;
            Ok(format!("{}\n", outcome.notice(state.sync().keyword())))
        }

        Command::Report { year, csv } => {
            let export = state.export_year(year.unwrap_or(today.year())).await?;
            let mut text = render::year_end(&export, &state.config.currency_symbol);
            if let Some(path) = csv {
                csv_export::write_ledger_file(&path, &export.ledger)?;
                text.push_str(&format!("\nLedger written to {}.\n", path.display()));
            }
            Ok(text)
        }

        Command::Demo => {
            if !gate.confirm("Load the demo data? All current data will be overwritten.") {
                return Ok("Nothing changed.\n".to_string());
            }
            state
                .store()
                .lock()
                .await
                .load_demo()
                .await
                .context("cannot save demo data")?;
            info!("demo data loaded");
            Ok("Demo data loaded.\n".to_string())
        }

        Command::Reset => {
            if !gate.confirm("Permanently delete all data (customers, bookings and invoices)?") {
                return Ok("Nothing changed.\n".to_string());
            }
            state.reset().await.context("cannot reset data")?;
            Ok("All data deleted.\n".to_string())
        }
    }
}
