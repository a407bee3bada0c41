//! The daily-workload ledger.
//!
//! One ledger exists per optimization run: created at run start, seeded
//! from context tasks, mutated by each allocation attempt, and returned
//! with the result. It is never persisted; the per-task allocation maps
//! are the durable record and the ledger is reconstructible from them.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

use planwise_core::{Task, HOURS_EPSILON};

/// Ordered mapping `date -> hours committed`, tracking how much of the
/// shared daily budget each date has left.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    hours: BTreeMap<NaiveDate, f64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hours already committed on `date`.
    pub fn booked(&self, date: NaiveDate) -> f64 {
        self.hours.get(&date).copied().unwrap_or(0.0)
    }

    /// Hours still open on `date` under the daily cap.
    ///
    /// When `date` is "today", the result is further capped to the hours
    /// remaining in the business day (`end_hour` minus the current time),
    /// so a run started at 19:00 cannot book an 18:00-close day.
    pub fn available_hours(
        &self,
        date: NaiveDate,
        max_hours_per_day: f64,
        current_time: NaiveDateTime,
        end_hour: u32,
    ) -> f64 {
        let mut available = (max_hours_per_day - self.booked(date)).max(0.0);
        if date == current_time.date() {
            let hour_fraction = f64::from(current_time.hour())
                + f64::from(current_time.minute()) / 60.0
                + f64::from(current_time.second()) / 3600.0;
            let remaining_today = (f64::from(end_hour) - hour_fraction).max(0.0);
            available = available.min(remaining_today);
        }
        available
    }

    /// Add `hours` to `date`.
    pub fn commit(&mut self, date: NaiveDate, hours: f64) {
        if hours <= 0.0 {
            return;
        }
        *self.hours.entry(date).or_insert(0.0) += hours;
    }

    /// Remove `hours` from `date`, dropping the entry when it reaches zero.
    ///
    /// Removing more than was committed is a rollback bug, not a capacity
    /// condition, and panics.
    pub fn uncommit(&mut self, date: NaiveDate, hours: f64) {
        let booked = self
            .hours
            .get_mut(&date)
            .unwrap_or_else(|| panic!("uncommit on {date} which holds no hours"));
        *booked -= hours;
        assert!(
            *booked > -HOURS_EPSILON,
            "ledger under-run on {date}: {booked}"
        );
        if booked.abs() < HOURS_EPSILON {
            self.hours.remove(&date);
        }
    }

    /// Commit every entry of the task's allocation map.
    pub fn seed(&mut self, task: &Task) {
        for (&date, &hours) in &task.daily_allocations {
            self.commit(date, hours);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.hours.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.hours.keys()
    }

    /// Sum of all committed hours.
    pub fn total_hours(&self) -> f64 {
        self.hours.values().sum()
    }

    /// Population variance of the committed hours per used day.
    pub fn variance(&self) -> f64 {
        if self.hours.is_empty() {
            return 0.0;
        }
        let n = self.hours.len() as f64;
        let mean = self.total_hours() / n;
        self.hours
            .values()
            .map(|&hours| (hours - mean).powi(2))
            .sum::<f64>()
            / n
    }

    /// The underlying map, for result reporting.
    pub fn as_map(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.hours
    }
}

impl FromIterator<(NaiveDate, f64)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            hours: iter.into_iter().collect(),
        }
    }
}
