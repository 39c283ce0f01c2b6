//! Month-grid projection of bookings.
//!
//! The grid has seven Monday-first columns. It starts with one blank cell per
//! weekday before the 1st and ends after the last day of the month; the last
//! row may be short.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Database, ServiceType};

pub const WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// A valid (year, month) pair, held as the first day of that month.
/// Navigation rolls over year boundaries and stops at chrono's date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    /// `None` unless `month` is in `1..=12` and the year is representable.
    pub fn new(
        year: i32,
        month: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        // Day 1 exists in every month chrono can represent.
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// `None` past the last representable month.
    pub fn next(self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    /// `None` before the first representable month.
    pub fn previous(self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// E.g. `"February 2024"`.
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl TryFrom<NaiveDate> for MonthCursor {
    type Error = String;

    fn try_from(first: NaiveDate) -> Result<Self, Self::Error> {
        if first.day() == 1 {
            Ok(Self { first })
        } else {
            Err(format!("month cursor must start on day 1, got {first}"))
        }
    }
}

impl From<MonthCursor> for NaiveDate {
    fn from(cursor: MonthCursor) -> Self {
        cursor.first
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(
    year: i32,
    month: u32,
) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Column of `date` in a Monday-first week (Monday = 0, Sunday = 6).
pub fn monday_index(date: NaiveDate) -> u32 {
    (date.weekday().num_days_from_sunday() + 6) % 7
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub booking_id: String,
    /// Local start time, `HH:MM`.
    pub time: String,
    pub customer_name: String,
    pub service_type: ServiceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    /// In booking collection order, not sorted by time.
    pub entries: Vec<CalendarEntry>,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarCell {
    Blank,
    Day(DayCell),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub cursor: MonthCursor,
    pub leading_blanks: usize,
    pub cells: Vec<CalendarCell>,
}

impl CalendarMonth {
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|cell| match cell {
            CalendarCell::Day(day) => Some(day),
            CalendarCell::Blank => None,
        })
    }

    pub fn day(
        &self,
        day: u32,
    ) -> Option<&DayCell> {
        self.days().find(|cell| cell.day() == day)
    }

    /// Rows of seven cells; the last row may be shorter.
    pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarCell> {
        self.cells.chunks(7)
    }
}

/// Lays out `cursor`'s month and places each booking on its local calendar
/// day. `today` only drives the highlight flag.
pub fn project_month(
    db: &Database,
    cursor: MonthCursor,
    today: NaiveDate,
) -> CalendarMonth {
    let lookup = db.lookup();
    let first = cursor.first_day();
    let leading_blanks = monday_index(first) as usize;
    let day_count = days_in_month(cursor.year(), cursor.month());

    let mut days: Vec<DayCell> = first
        .iter_days()
        .take(day_count as usize)
        .map(|date| DayCell {
            date,
            is_today: date == today,
            entries: Vec::new(),
        })
        .collect();

    for booking in &db.bookings {
        let Some(start) = booking.local_appointment() else {
            continue;
        };
        if MonthCursor::containing(start.date()) != cursor {
            continue;
        }
        if let Some(cell) = days.get_mut(start.day0() as usize) {
            cell.entries.push(CalendarEntry {
                booking_id: booking.id.clone(),
                time: start.format("%H:%M").to_string(),
                customer_name: lookup.customer_name(&booking.customer_id).to_string(),
                service_type: booking.service_type,
            });
        }
    }

    debug!(month = %cursor.label(), leading_blanks, day_count, "calendar projected");

    let cells = std::iter::repeat_n(CalendarCell::Blank, leading_blanks)
        .chain(days.into_iter().map(CalendarCell::Day))
        .collect();

    CalendarMonth {
        cursor,
        leading_blanks,
        cells,
    }
}
