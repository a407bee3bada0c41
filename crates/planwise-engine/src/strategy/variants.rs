//! Composable strategy variants.
//!
//! Each variant is a permutation of an ordering rule and an allocator
//! choice over the shared building blocks; none introduces primitives of
//! its own.

use planwise_core::{SchedulerError, Task};

use crate::alloc::{BackwardAllocator, GreedyForwardAllocator};
use crate::order::{scheduling_order, shortest_first_order, topological_order};
use crate::params::OptimizeParams;
use crate::strategy::{run_ordered_strategy, seeded_ledger, OptimizeResult, Strategy};

/// Greedy ordering with a deadline-enforcing allocator: a task whose
/// earliest-finish plan overruns its deadline fails instead of slipping.
#[derive(Clone, Debug)]
pub struct HardDeadlineStrategy {
    allocator: GreedyForwardAllocator,
}

impl HardDeadlineStrategy {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            allocator: GreedyForwardAllocator::enforcing_deadline(
                default_start_hour,
                default_end_hour,
            ),
        }
    }
}

impl Strategy for HardDeadlineStrategy {
    fn name(&self) -> &'static str {
        "hard_deadline"
    }

    fn optimize(
        &self,
        candidates: &[Task],
        context_tasks: &[Task],
        params: &OptimizeParams,
    ) -> Result<OptimizeResult, SchedulerError> {
        if candidates.is_empty() {
            return Ok(OptimizeResult {
                ledger: seeded_ledger(context_tasks),
                ..OptimizeResult::default()
            });
        }
        let mut ordered = candidates.to_vec();
        ordered.sort_by(scheduling_order);
        let ordered = topological_order(ordered)?;
        run_ordered_strategy(self.name(), ordered, context_tasks, &self.allocator, params)
    }
}

/// Greedy ordering with backward allocation: work is packed against each
/// task's deadline, leaving the near days free.
#[derive(Clone, Debug)]
pub struct DeadlinePackedStrategy {
    allocator: BackwardAllocator,
}

impl DeadlinePackedStrategy {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            allocator: BackwardAllocator::new(default_start_hour, default_end_hour),
        }
    }
}

impl Strategy for DeadlinePackedStrategy {
    fn name(&self) -> &'static str {
        "deadline_packed"
    }

    fn optimize(
        &self,
        candidates: &[Task],
        context_tasks: &[Task],
        params: &OptimizeParams,
    ) -> Result<OptimizeResult, SchedulerError> {
        if candidates.is_empty() {
            return Ok(OptimizeResult {
                ledger: seeded_ledger(context_tasks),
                ..OptimizeResult::default()
            });
        }
        let mut ordered = candidates.to_vec();
        ordered.sort_by(scheduling_order);
        let ordered = topological_order(ordered)?;
        run_ordered_strategy(self.name(), ordered, context_tasks, &self.allocator, params)
    }
}

/// Shortest tasks first: ascending estimated duration, greedy filling.
/// Clears many small tasks early at the cost of delaying large ones.
#[derive(Clone, Debug)]
pub struct ShortTasksFirstStrategy {
    allocator: GreedyForwardAllocator,
}

impl ShortTasksFirstStrategy {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            allocator: GreedyForwardAllocator::new(default_start_hour, default_end_hour),
        }
    }
}

impl Strategy for ShortTasksFirstStrategy {
    fn name(&self) -> &'static str {
        "short_tasks_first"
    }

    fn optimize(
        &self,
        candidates: &[Task],
        context_tasks: &[Task],
        params: &OptimizeParams,
    ) -> Result<OptimizeResult, SchedulerError> {
        if candidates.is_empty() {
            return Ok(OptimizeResult {
                ledger: seeded_ledger(context_tasks),
                ..OptimizeResult::default()
            });
        }
        let mut ordered = candidates.to_vec();
        ordered.sort_by(shortest_first_order);
        let ordered = topological_order(ordered)?;
        run_ordered_strategy(self.name(), ordered, context_tasks, &self.allocator, params)
    }
}
