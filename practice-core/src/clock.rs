use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now". Injected wherever the core stamps or highlights dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar date of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(
        &self,
        now: DateTime<Utc>,
    ) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Timestamp-derived ids, strictly increasing within one generator.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn next(
        &mut self,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> String {
        let candidate = now.timestamp_millis();
        self.last = if candidate > self.last {
            candidate
        } else {
            self.last + 1
        };
        format!("{prefix}{}", self.last)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ids_stay_unique_when_the_clock_stands_still() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut ids = IdGenerator::default();

        let first = ids.next("C-", now);
        let second = ids.next("C-", now);

        assert_eq!(first, format!("C-{}", now.timestamp_millis()));
        assert_eq!(second, format!("C-{}", now.timestamp_millis() + 1));
    }

    #[test]
    fn ids_never_go_backwards() {
        let later = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut ids = IdGenerator::default();

        ids.next("B-", later);
        let next = ids.next("B-", earlier);

        assert_eq!(next, format!("B-{}", later.timestamp_millis() + 1));
    }

    #[test]
    fn fixed_clock_reports_what_it_was_set_to() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let clock = FixedClock::at(t0);
        assert_eq!(clock.now(), t0);

        clock.set(t1);
        assert_eq!(clock.now(), t1);
    }
}
