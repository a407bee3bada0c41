//! Schedule fitness scoring.
//!
//! The calculator is pure: it sees only the scheduled tasks (in their
//! allocation order) and the final ledger, never the wall clock or any
//! randomness, so identical schedules always score identically.

use planwise_core::Task;

use crate::ledger::Ledger;

/// Penalty per day a task finishes past its deadline.
pub const DEADLINE_PENALTY_PER_DAY: f64 = 100.0;

/// Weight applied to the variance of hours per used day.
pub const WORKLOAD_VARIANCE_WEIGHT: f64 = 10.0;

/// Bonus per scheduled task, when enabled.
///
/// Randomized strategies enable it so that orderings which fit more tasks
/// beat orderings that score well on fewer.
pub const SCHEDULED_TASK_BONUS: f64 = 50.0;

/// Scores a completed schedule; higher is better.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleFitness;

impl ScheduleFitness {
    pub fn new() -> Self {
        Self
    }

    /// Combined fitness of `tasks` (in allocation order) against `ledger`.
    pub fn calculate(&self, tasks: &[Task], ledger: &Ledger, include_scheduling_bonus: bool) -> f64 {
        let mut fitness = self.priority_score(tasks) - self.deadline_penalty(tasks)
            - self.workload_penalty(ledger);
        if include_scheduling_bonus {
            fitness += SCHEDULED_TASK_BONUS * tasks.len() as f64;
        }
        fitness
    }

    /// Rewards placing high-priority tasks early: `Σ priority · (n − i)`.
    pub fn priority_score(&self, tasks: &[Task]) -> f64 {
        let n = tasks.len();
        tasks
            .iter()
            .enumerate()
            .map(|(i, task)| f64::from(task.priority) * (n - i) as f64)
            .sum()
    }

    /// `Σ max(0, days late) · DEADLINE_PENALTY_PER_DAY` over tasks with
    /// both a deadline and a planned end.
    pub fn deadline_penalty(&self, tasks: &[Task]) -> f64 {
        tasks
            .iter()
            .filter_map(|task| {
                let deadline = task.deadline?;
                let end = task.planned_end?;
                let days_late = (end.date() - deadline.date()).num_days();
                (days_late > 0).then(|| days_late as f64 * DEADLINE_PENALTY_PER_DAY)
            })
            .sum()
    }

    /// Variance of hours per used day, weighted.
    pub fn workload_penalty(&self, ledger: &Ledger) -> f64 {
        ledger.variance() * WORKLOAD_VARIANCE_WEIGHT
    }
}
