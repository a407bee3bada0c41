//! Parameters of one optimization run.

use chrono::{NaiveDate, NaiveDateTime};

use planwise_core::{SchedulerError, WorkCalendar};

/// Immutable inputs shared by every allocation in a run.
#[derive(Clone, Debug)]
pub struct OptimizeParams {
    /// Run origin; no hours are placed before this instant's date
    pub start_date: NaiveDateTime,
    /// Daily capacity shared by all tasks, in hours
    pub max_hours_per_day: f64,
    /// Allow re-planning of tasks that already have a planned window
    pub force_override: bool,
    /// "Now", used to cap what is still available today
    pub current_time: NaiveDateTime,
    /// Working-day classification for the run
    pub calendar: WorkCalendar,
    /// Seed for randomized strategies; `None` draws from entropy
    pub rng_seed: Option<u64>,
}

impl OptimizeParams {
    pub fn new(start_date: NaiveDateTime, max_hours_per_day: f64, current_time: NaiveDateTime) -> Self {
        Self {
            start_date,
            max_hours_per_day,
            force_override: false,
            current_time,
            calendar: WorkCalendar::new(),
            rng_seed: None,
        }
    }

    pub fn force_override(mut self, force: bool) -> Self {
        self.force_override = force;
        self
    }

    pub fn calendar(mut self, calendar: WorkCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// First date an allocator may place hours on: the later of the run
    /// origin and today, advanced to a working day.
    pub fn earliest_allocation_date(&self) -> Result<NaiveDate, SchedulerError> {
        let base = self.start_date.date().max(self.current_time.date());
        self.calendar.next_working_day(base)
    }
}
