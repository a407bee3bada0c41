//! Working-day arithmetic.
//!
//! Every strategy and allocator expresses its date math in working days;
//! centralizing the weekend/holiday classification here keeps them all
//! consistent.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::SchedulerError;

/// Upper bound on calendar scans.
///
/// `next_working_day`/`prev_working_day` step one day at a time; a gap of
/// more than a year of non-working days means the holiday oracle is
/// feeding us garbage, and we fail instead of walking off the calendar.
pub const MAX_CALENDAR_SCAN_DAYS: u32 = 365;

/// Source of holiday information, typically backed by a country calendar.
pub trait HolidayOracle: Send + Sync {
    /// True iff the date is a holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// All holidays within `start..=end`.
    fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
        let mut holidays = BTreeSet::new();
        let mut date = start;
        while date <= end {
            if self.is_holiday(date) {
                holidays.insert(date);
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        holidays
    }
}

/// A fixed set of holiday dates; the oracle used in tests and for
/// user-maintained holiday lists.
#[derive(Clone, Debug, Default)]
pub struct FixedHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl FixedHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayOracle for FixedHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
        self.dates.range(start..=end).copied().collect()
    }
}

/// Classifies dates as working or non-working.
///
/// Saturdays and Sundays are always non-working; an optional
/// [`HolidayOracle`] excludes further dates.
#[derive(Clone, Default)]
pub struct WorkCalendar {
    holidays: Option<Arc<dyn HolidayOracle>>,
}

impl fmt::Debug for WorkCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkCalendar")
            .field("has_holiday_oracle", &self.holidays.is_some())
            .finish()
    }
}

impl WorkCalendar {
    /// Weekends-only calendar.
    pub fn new() -> Self {
        Self { holidays: None }
    }

    /// Calendar that also excludes the oracle's holidays.
    pub fn with_holidays(oracle: Arc<dyn HolidayOracle>) -> Self {
        Self {
            holidays: Some(oracle),
        }
    }

    /// True iff the date is neither a weekend nor a holiday.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        if let Some(oracle) = &self.holidays {
            if oracle.is_holiday(date) {
                return false;
            }
        }
        true
    }

    /// First working day at or after `date`.
    pub fn next_working_day(&self, date: NaiveDate) -> Result<NaiveDate, SchedulerError> {
        self.scan(date, Direction::Forward)
    }

    /// Last working day at or before `date`.
    pub fn prev_working_day(&self, date: NaiveDate) -> Result<NaiveDate, SchedulerError> {
        self.scan(date, Direction::Backward)
    }

    fn scan(&self, start: NaiveDate, direction: Direction) -> Result<NaiveDate, SchedulerError> {
        let mut date = start;
        for _ in 0..=MAX_CALENDAR_SCAN_DAYS {
            if self.is_working_day(date) {
                return Ok(date);
            }
            let step = match direction {
                Direction::Forward => date.succ_opt(),
                Direction::Backward => date.pred_opt(),
            };
            date = step.ok_or_else(|| {
                SchedulerError::Internal(format!("calendar scan ran off the date range at {date}"))
            })?;
        }
        Err(SchedulerError::Internal(format!(
            "no working day within {MAX_CALENDAR_SCAN_DAYS} days of {start}"
        )))
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekends_are_not_working_days() {
        let cal = WorkCalendar::new();
        assert!(cal.is_working_day(d(2025, 10, 20))); // Monday
        assert!(cal.is_working_day(d(2025, 10, 24))); // Friday
        assert!(!cal.is_working_day(d(2025, 10, 25))); // Saturday
        assert!(!cal.is_working_day(d(2025, 10, 26))); // Sunday
    }

    #[test]
    fn holidays_are_not_working_days() {
        let oracle = Arc::new(FixedHolidays::new([d(2026, 1, 1)]));
        let cal = WorkCalendar::with_holidays(oracle);
        assert!(!cal.is_working_day(d(2026, 1, 1))); // Thursday, holiday
        assert!(cal.is_working_day(d(2026, 1, 2)));
    }

    #[test]
    fn next_working_day_keeps_a_working_date() {
        let cal = WorkCalendar::new();
        assert_eq!(cal.next_working_day(d(2025, 10, 20)).unwrap(), d(2025, 10, 20));
    }

    #[test]
    fn next_working_day_skips_the_weekend() {
        let cal = WorkCalendar::new();
        assert_eq!(cal.next_working_day(d(2025, 10, 25)).unwrap(), d(2025, 10, 27));
    }

    #[test]
    fn prev_working_day_skips_back_over_the_weekend() {
        let cal = WorkCalendar::new();
        assert_eq!(cal.prev_working_day(d(2025, 10, 26)).unwrap(), d(2025, 10, 24));
    }

    #[test]
    fn prev_working_day_skips_holidays() {
        let oracle = Arc::new(FixedHolidays::new([d(2026, 1, 1)]));
        let cal = WorkCalendar::with_holidays(oracle);
        // Jan 1 2026 is a Thursday holiday; scanning back from it lands on Wed.
        assert_eq!(cal.prev_working_day(d(2026, 1, 1)).unwrap(), d(2025, 12, 31));
    }

    #[test]
    fn scan_fails_when_no_working_day_exists() {
        struct Always;
        impl HolidayOracle for Always {
            fn is_holiday(&self, _date: NaiveDate) -> bool {
                true
            }
        }
        let cal = WorkCalendar::with_holidays(Arc::new(Always));
        let err = cal.next_working_day(d(2025, 10, 20)).unwrap_err();
        assert!(matches!(err, SchedulerError::Internal(_)));
    }

    #[test]
    fn holidays_in_range_from_fixed_set() {
        let oracle = FixedHolidays::new([d(2026, 1, 1), d(2026, 5, 1), d(2026, 12, 25)]);
        let in_range = oracle.holidays_in_range(d(2026, 1, 1), d(2026, 6, 30));
        assert_eq!(in_range.len(), 2);
        assert!(in_range.contains(&d(2026, 5, 1)));
    }
}
