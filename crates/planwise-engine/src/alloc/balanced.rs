//! Even-spread allocation across the candidate window.

use chrono::{NaiveDate, TimeDelta};
use std::collections::BTreeMap;
use tracing::debug;

use planwise_core::{SchedulerError, Task, HOURS_EPSILON};

use crate::alloc::{prepare_task_for_allocation, roll_back, set_planned_times, AllocationError, Allocator, GreedyForwardAllocator};
use crate::ledger::Ledger;
use crate::params::OptimizeParams;

/// Window used when a task has no deadline to bound the spread.
const DEFAULT_WINDOW_DAYS: i64 = 14;

/// Distributes a task's hours evenly over the working days between the
/// earliest start and the deadline.
///
/// When the even per-day target cannot fit under the daily cap (the
/// window is too short to balance), the allocator falls back to greedy
/// forward filling rather than failing outright.
#[derive(Clone, Debug)]
pub struct BalancedAllocator {
    default_start_hour: u32,
    default_end_hour: u32,
    fallback: GreedyForwardAllocator,
}

impl BalancedAllocator {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            default_start_hour,
            default_end_hour,
            fallback: GreedyForwardAllocator::new(default_start_hour, default_end_hour),
        }
    }

    /// Working days from `earliest` through the window end, inclusive.
    fn window_days(
        &self,
        params: &OptimizeParams,
        earliest: NaiveDate,
        deadline: Option<NaiveDate>,
    ) -> Result<Vec<NaiveDate>, SchedulerError> {
        let window_end = match deadline {
            Some(date) => params.calendar.prev_working_day(date)?,
            None => earliest + TimeDelta::days(DEFAULT_WINDOW_DAYS - 1),
        };

        let mut days = Vec::new();
        let mut date = earliest;
        while date <= window_end {
            if params.calendar.is_working_day(date) {
                days.push(date);
            }
            date = date.succ_opt().ok_or_else(|| {
                SchedulerError::Internal(format!("window scan ran off the calendar at {date}"))
            })?;
        }
        Ok(days)
    }
}

impl Allocator for BalancedAllocator {
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
        let days = self.window_days(params, earliest, clone.deadline.map(|d| d.date()))?;

        // An empty or too-short window cannot be balanced; greedy filling
        // still produces a plan (a soft deadline may be overrun).
        if days.is_empty() {
            return self.fallback.allocate(task, ledger, params);
        }
        let target = total / days.len() as f64;
        if target > params.max_hours_per_day + HOURS_EPSILON {
            debug!(
                task = clone.name.as_str(),
                target,
                cap = params.max_hours_per_day,
                "per-day target exceeds cap, falling back to greedy"
            );
            return self.fallback.allocate(task, ledger, params);
        }

        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut remaining = total;

        // Pass 1: the even target on each day, as far as capacity allows.
        for &date in &days {
            let available = ledger.available_hours(
                date,
                params.max_hours_per_day,
                params.current_time,
                self.default_end_hour,
            );
            let hours = target.min(available).min(remaining);
            if hours > HOURS_EPSILON {
                ledger.commit(date, hours);
                per_day.insert(date, hours);
                remaining -= hours;
            }
        }

        // Pass 2: push any shortfall into whatever headroom is left.
        if remaining > HOURS_EPSILON {
            for &date in &days {
                let available = ledger.available_hours(
                    date,
                    params.max_hours_per_day,
                    params.current_time,
                    self.default_end_hour,
                );
                let extra = remaining.min(available);
                if extra > HOURS_EPSILON {
                    ledger.commit(date, extra);
                    *per_day.entry(date).or_insert(0.0) += extra;
                    remaining -= extra;
                }
                if remaining <= HOURS_EPSILON {
                    break;
                }
            }
        }

        if remaining > HOURS_EPSILON {
            roll_back(ledger, &per_day);
            return Err(AllocationError::Infeasible(
                "capacity shortfall after redistribution".into(),
            ));
        }

        // The window may contain holidays or full days; the plan's end is
        // the last date that actually received hours, not the window end.
        let (Some(&first), Some(&last)) = (per_day.keys().next(), per_day.keys().next_back())
        else {
            return Err(AllocationError::Infeasible("nothing to allocate".into()));
        };

        debug!(
            task = clone.name.as_str(),
            first = %first,
            last = %last,
            days = per_day.len(),
            target,
            "balanced allocation"
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
