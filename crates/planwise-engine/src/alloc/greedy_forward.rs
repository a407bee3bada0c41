//! Earliest-finish allocation: fill each working day to capacity.

use chrono::TimeDelta;
use std::collections::BTreeMap;
use tracing::debug;

use planwise_core::{SchedulerError, Task, HOURS_EPSILON};

use crate::alloc::{prepare_task_for_allocation, roll_back, set_planned_times, AllocationError, Allocator};
use crate::ledger::Ledger;
use crate::params::OptimizeParams;

/// How far past the earliest start the forward walk may search.
pub const ALLOCATION_HORIZON_DAYS: i64 = 365;

/// Walks forward from the earliest allowed date, committing
/// `min(remaining, available)` hours on every working day until the task
/// is fully placed.
///
/// Deadline overrun is allowed by default; the fitness calculator reports
/// it. The `enforcing_deadline` constructor turns an overrun into an
/// infeasibility instead, for the hard-deadline strategy.
#[derive(Clone, Debug)]
pub struct GreedyForwardAllocator {
    default_start_hour: u32,
    default_end_hour: u32,
    enforce_deadline: bool,
}

impl GreedyForwardAllocator {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            default_start_hour,
            default_end_hour,
            enforce_deadline: false,
        }
    }

    pub fn enforcing_deadline(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            default_start_hour,
            default_end_hour,
            enforce_deadline: true,
        }
    }
}

impl Allocator for GreedyForwardAllocator {
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

        let earliest = params.earliest_allocation_date()?;
        let horizon = earliest + TimeDelta::days(ALLOCATION_HORIZON_DAYS);

        let mut per_day: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
        let mut remaining = total;
        let mut date = earliest;
        while remaining > HOURS_EPSILON {
            if date > horizon {
                roll_back(ledger, &per_day);
                return Err(AllocationError::Infeasible(
                    "insufficient capacity before horizon".into(),
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

        let (Some(&first), Some(&last)) = (per_day.keys().next(), per_day.keys().next_back())
        else {
            return Err(AllocationError::Infeasible("nothing to allocate".into()));
        };

        if self.enforce_deadline {
            if let Some(deadline) = clone.deadline {
                if last > deadline.date() {
                    roll_back(ledger, &per_day);
                    return Err(AllocationError::Infeasible(format!(
                        "deadline exceeded: work runs until {last}, deadline is {}",
                        deadline.date()
                    )));
                }
            }
        }

        debug!(
            task = clone.name.as_str(),
            first = %first,
            last = %last,
            days = per_day.len(),
            "greedy forward allocation"
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
