//! Greedy strategy: highest priority first, earliest finish per task.

use planwise_core::{SchedulerError, Task};

use crate::alloc::GreedyForwardAllocator;
use crate::order::{scheduling_order, topological_order};
use crate::params::OptimizeParams;
use crate::strategy::{run_ordered_strategy, seeded_ledger, OptimizeResult, Strategy};

/// Deterministic baseline: candidates sorted by (priority descending,
/// deadline ascending with absent deadlines last, id ascending), arranged
/// so dependencies come first, then greedily packed onto the earliest
/// working days.
#[derive(Clone, Debug)]
pub struct GreedyStrategy {
    allocator: GreedyForwardAllocator,
}

impl GreedyStrategy {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            allocator: GreedyForwardAllocator::new(default_start_hour, default_end_hour),
        }
    }
}

impl Strategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
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
