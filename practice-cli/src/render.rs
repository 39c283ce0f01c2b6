//! Plain-text rendering of the derived views for the terminal.

use std::fmt::Write;

use practice_core::calculations::{DashboardStats, format_money};
use practice_core::calendar::{CalendarCell, CalendarMonth, WEEKDAY_LABELS};
use practice_core::report::YearEndExport;
use practice_core::views::BookingRow;
use practice_core::{Booking, Customer};

pub fn customers(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers yet.\n".to_string();
    }
    let mut out = String::new();
    for c in customers {
        let _ = writeln!(out, "{:<18} {:<24} {:<28} {}", c.id, c.name, c.email, c.phone);
    }
    out
}

pub fn bookings(rows: &[BookingRow]) -> String {
    if rows.is_empty() {
        return "No bookings yet.\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:<18} {:<24} {:<24} {:<16} {:<9}{}",
            row.booking_id,
            row.appointment_date_time,
            row.customer_name,
            row.service_type.as_str(),
            row.payment_status.as_str(),
            if row.imported { " [imported]" } else { "" }
        );
    }
    out
}

pub fn dashboard(
    stats: &DashboardStats,
    recent: &[(&Booking, &str)],
    currency: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Overview {}", stats.year);
    let _ = writeln!(out, "  Earnings:        {}", format_money(stats.total_earnings, currency));
    let _ = writeln!(out, "    cash:          {}", format_money(stats.cash_earnings, currency));
    let _ = writeln!(out, "    bank transfer: {}", format_money(stats.transfer_earnings, currency));
    let _ = writeln!(out, "  Treatments:      {}", stats.treatment_count);
    let _ = writeln!(out, "  Customers:       {}", stats.total_customers);
    let _ = writeln!(out, "  Open invoices:   {}", stats.open_invoices_count);
    let _ = writeln!(out);
    let _ = writeln!(out, "Recent bookings");
    if recent.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for (booking, customer_name) in recent {
        let when = booking
            .local_appointment()
            .map_or_else(|| booking.appointment_date_time.clone(), |dt| {
                dt.format("%Y-%m-%d %H:%M").to_string()
            });
        let _ = writeln!(
            out,
            "  {when}  {customer_name} ({})",
            booking.service_type.as_str()
        );
    }
    out
}

/// Month grid with today in brackets and booked days starred, followed by
/// the entries of each booked day.
pub fn calendar(month: &CalendarMonth) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", month.cursor.label());
    let _ = writeln!(out, "{}", WEEKDAY_LABELS.map(|l| format!("{l:>4}")).concat());
    for week in month.weeks() {
        for cell in week {
            match cell {
                CalendarCell::Blank => out.push_str("    "),
                CalendarCell::Day(day) => {
                    let mark = if day.entries.is_empty() { ' ' } else { '*' };
                    if day.is_today {
                        let _ = write!(out, "[{:>2}]", day.day());
                    } else {
                        let _ = write!(out, " {:>2}{mark}", day.day());
                    }
                }
            }
        }
        out.push('\n');
    }
    for day in month.days().filter(|d| !d.entries.is_empty()) {
        for entry in &day.entries {
            let _ = writeln!(
                out,
                "{}  {}  {} ({})",
                day.date.format("%Y-%m-%d"),
                entry.time,
                entry.customer_name,
                entry.service_type.as_str()
            );
        }
    }
    out
}

pub fn year_end(
    export: &YearEndExport,
    currency: &str,
) -> String {
    let report = &export.report;
    let mut out = String::new();
    let _ = writeln!(out, "Year-end report {}", report.year);
    let _ = writeln!(out, "Generated on {}", export.generated_on.format("%Y-%m-%d"));
    let _ = writeln!(out);
    let _ = writeln!(out, "  Gross total:     {}", format_money(report.gross_total, currency));
    let _ = writeln!(out, "    cash:          {}", format_money(report.by_method.cash, currency));
    let _ = writeln!(
        out,
        "    bank transfer: {}",
        format_money(report.by_method.bank_transfer, currency)
    );
    let _ = writeln!(out, "  Treatments:      {}", report.treatment_count);
    let _ = writeln!(out, "  Open amount:     {}", format_money(report.open_amount, currency));
    let _ = writeln!(out);
    let _ = writeln!(out, "Ledger");
    if export.ledger.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for row in &export.ledger {
        let _ = writeln!(
            out,
            "  {:<10}  {:<14}  {:<24}  {:<12}  {:>12}",
            row.payment_date_label(),
            row.invoice_number,
            row.customer_name,
            row.payment_method.as_str(),
            format_money(row.gross_amount, currency)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Analysis");
    let _ = writeln!(out, "  {}", export.narrative);
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use practice_core::calculations::compute_dashboard_stats;
    use practice_core::calendar::{MonthCursor, project_month};
    use practice_core::demo::demo_database;
    use practice_core::views::recent_bookings;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dashboard_shows_money_with_currency() {
        let db = demo_database();
        let stats = compute_dashboard_stats(&db, 2026);
        let recent = recent_bookings(&db, 5);

        let text = dashboard(&stats, &recent, "€");

        assert!(text.contains("Earnings:        85.00 €"));
        assert!(text.contains("2026-01-15 10:00  Max Mustermann (1-hour session)"));
    }

    #[test]
    fn calendar_marks_booked_day_and_today() {
        let db = demo_database();
        let cursor = MonthCursor::new(2026, 1).unwrap();
        let month = project_month(&db, cursor, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());

        let text = calendar(&month);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "  Mo  Tu  We  Th  Fr  Sa  Su");
        // 2026-01-01 is a Thursday: three blank columns first.
        assert_eq!(lines[2], "              1   2   3   4 ");
        assert!(lines[4].contains(" 15*"));
        assert!(lines[5].contains("[20]"));
        assert!(text.contains("2026-01-15  10:00  Max Mustermann (1-hour session)"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(customers(&[]), "No customers yet.\n");
        assert_eq!(bookings(&[]), "No bookings yet.\n");
    }
}
