//! Latest-finish allocation: pack hours against the deadline.

use chrono::{NaiveDate, TimeDelta};
use std::collections::BTreeMap;
use tracing::debug;

use planwise_core::{SchedulerError, Task, HOURS_EPSILON};

use crate::alloc::{prepare_task_for_allocation, roll_back, set_planned_times, AllocationError, Allocator};
use crate::ledger::Ledger;
use crate::params::OptimizeParams;

/// Window used when a task has no deadline to walk back from.
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Walks backward from the deadline's working date, committing
/// `min(remaining, available)` per day, so the task finishes as late as
/// allowed. Without a deadline it fills forward inside a one-week window.
#[derive(Clone, Debug)]
pub struct BackwardAllocator {
    default_start_hour: u32,
    default_end_hour: u32,
}

impl BackwardAllocator {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            default_start_hour,
            default_end_hour,
        }
    }

    fn fill_backward(
        &self,
        ledger: &mut Ledger,
        params: &OptimizeParams,
        from: NaiveDate,
        floor: NaiveDate,
        total: f64,
    ) -> Result<BTreeMap<NaiveDate, f64>, AllocationError> {
        let mut per_day = BTreeMap::new();
        let mut remaining = total;
        let mut date = from;
        while remaining > HOURS_EPSILON {
            if date < floor {
                roll_back(ledger, &per_day);
                return Err(AllocationError::Infeasible(
                    "insufficient capacity between start and deadline".into(),
                ));
            }
            if params.calendar.is_working_day(date) {
                let available = ledger.available_hours(
                    date,
                    params.max_hours_per_day,
                    params.current_time,
                    self.default_end_hour,
                );
                if available > HOURS_EPSILON {
                    let hours = remaining.min(available);
                    ledger.commit(date, hours);
                    per_day.insert(date, hours);
                    remaining -= hours;
                }
            }
            date = match date.pred_opt() {
                Some(prev) => prev,
                None => {
                    roll_back(ledger, &per_day);
                    return Err(AllocationError::Fatal(SchedulerError::Internal(format!(
                        "backward walk ran off the calendar at {date}"
                    ))));
                }
            };
        }
        Ok(per_day)
    }

    /// Forward fill bounded to the one-week default window; the
    /// no-deadline fallback.
    fn fill_default_window(
        &self,
        ledger: &mut Ledger,
        params: &OptimizeParams,
        total: f64,
    ) -> Result<BTreeMap<NaiveDate, f64>, AllocationError> {
        let earliest = params.earliest_allocation_date()?;
        let window_end = earliest + TimeDelta::days(DEFAULT_WINDOW_DAYS - 1);

        let mut per_day = BTreeMap::new();
        let mut remaining = total;
        let mut date = earliest;
        while remaining > HOURS_EPSILON {
            if date > window_end {
                roll_back(ledger, &per_day);
                return Err(AllocationError::Infeasible(
                    "insufficient capacity in default one-week window".into(),
                ));
            }
            if params.calendar.is_working_day(date) {
                let available = ledger.available_hours(
                    date,
                    params.max_hours_per_day,
                    params.current_time,
                    self.default_end_hour,
                );
                if available > HOURS_EPSILON {
                    let hours = remaining.min(available);
                    ledger.commit(date, hours);
                    per_day.insert(date, hours);
                    remaining -= hours;
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => {
                    roll_back(ledger, &per_day);
                    return Err(AllocationError::Fatal(SchedulerError::Internal(format!(
                        "forward walk ran off the calendar at {date}"
                    ))));
                }
            };
        }
        Ok(per_day)
    }
}

impl Allocator for BackwardAllocator {
    fn allocate(
        &self,
        task: &Task,
        ledger: &mut Ledger,
        params: &OptimizeParams,
    ) -> Result<Task, AllocationError> {
        let Some(mut clone) = prepare_task_for_allocation(task) else {
            return Err(AllocationError::Infeasible("no estimated duration".into()));
        };
        let total = clone.estimated_duration.unwrap_or(0.0);

        let per_day = match clone.deadline {
            Some(deadline) => {
                let from = params.calendar.prev_working_day(deadline.date())?;
                let floor = params.start_date.date().max(params.current_time.date());
                self.fill_backward(ledger, params, from, floor, total)?
            }
            None => self.fill_default_window(ledger, params, total)?,
        };

        let (Some(&first), Some(&last)) = (per_day.keys().next(), per_day.keys().next_back())
        else {
            return Err(AllocationError::Infeasible("nothing to allocate".into()));
        };

        debug!(
            task = clone.name.as_str(),
            first = %first,
            last = %last,
            days = per_day.len(),
            "backward allocation"
        );

        let committed = per_day.clone();
        if let Err(err) = set_planned_times(
            &mut clone,
            first,
            last,
            per_day,
            self.default_start_hour,
            self.default_end_hour,
        ) {
            roll_back(ledger, &committed);
            return Err(AllocationError::Fatal(err));
        }
        Ok(clone)
    }
}
