//! Allocation primitives shared by every strategy.
//!
//! An [`Allocator`] places one task's hours on the ledger and writes the
//! task's planned window. The contract all variants honor: on success the
//! returned clone carries the per-day map that was newly committed to the
//! ledger; on an infeasible task every partial commit has been rolled
//! back, leaving the ledger exactly as it was observed before the call.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

use planwise_core::{SchedulerError, Task};

use crate::ledger::Ledger;
use crate::params::OptimizeParams;

mod backward;
mod balanced;
mod greedy_forward;

pub use backward::BackwardAllocator;
pub use balanced::BalancedAllocator;
pub use greedy_forward::{GreedyForwardAllocator, ALLOCATION_HORIZON_DAYS};

/// Why an allocation attempt did not produce a plan.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The task cannot fit; recorded in the result, never raised. The
    /// ledger has been rolled back.
    #[error("{0}")]
    Infeasible(String),

    /// An invariant was violated; aborts the whole run.
    #[error(transparent)]
    Fatal(#[from] SchedulerError),
}

/// Places a single task's hours on the ledger.
pub trait Allocator: Send + Sync {
    fn allocate(
        &self,
        task: &Task,
        ledger: &mut Ledger,
        params: &OptimizeParams,
    ) -> Result<Task, AllocationError>;
}

/// An independent copy of the task for a trial allocation, or `None` when
/// the task has no estimated duration. A failed attempt discards the
/// clone wholesale; the caller's task is never touched.
pub fn prepare_task_for_allocation(task: &Task) -> Option<Task> {
    task.estimated_duration?;
    Some(task.clone())
}

/// Write the planned window and allocation map onto the task.
///
/// The window must agree with the map: `first`/`last` have to be the
/// smallest and largest allocated dates. A mismatch is a bug in the
/// calling allocator, surfaced as [`SchedulerError::Internal`].
pub fn set_planned_times(
    task: &mut Task,
    first_date: NaiveDate,
    last_date: NaiveDate,
    per_day: BTreeMap<NaiveDate, f64>,
    default_start_hour: u32,
    default_end_hour: u32,
) -> Result<(), SchedulerError> {
    let min_key = per_day.keys().next().copied();
    let max_key = per_day.keys().next_back().copied();
    if min_key != Some(first_date) || max_key != Some(last_date) {
        return Err(SchedulerError::Internal(format!(
            "planned window {first_date}..{last_date} disagrees with allocated dates {min_key:?}..{max_key:?}"
        )));
    }

    let start = first_date
        .and_hms_opt(default_start_hour, 0, 0)
        .ok_or_else(|| SchedulerError::Internal(format!("invalid start hour {default_start_hour}")))?;
    let end = last_date
        .and_hms_opt(default_end_hour, 0, 0)
        .ok_or_else(|| SchedulerError::Internal(format!("invalid end hour {default_end_hour}")))?;
    task.planned_start = Some(start);
    task.planned_end = Some(end);
    task.daily_allocations = per_day;
    Ok(())
}

/// Undo every commit in `per_day`, restoring the ledger to its state
/// before the attempt.
pub(crate) fn roll_back(ledger: &mut Ledger, per_day: &BTreeMap<NaiveDate, f64>) {
    for (&date, &hours) in per_day {
        ledger.uncommit(date, hours);
    }
}
