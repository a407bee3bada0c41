//! Balanced strategy: greedy ordering, even per-day spread.

use planwise_core::{SchedulerError, Task};

use crate::alloc::BalancedAllocator;
use crate::order::{scheduling_order, topological_order};
use crate::params::OptimizeParams;
use crate::strategy::{run_ordered_strategy, seeded_ledger, OptimizeResult, Strategy};

/// Same ordering as the greedy strategy, but each task's hours are spread
/// evenly across its window; tasks too large to balance fall back to
/// greedy filling inside the allocator.
#[derive(Clone, Debug)]
pub struct BalancedStrategy {
    allocator: BalancedAllocator,
}

impl BalancedStrategy {
    pub fn new(default_start_hour: u32, default_end_hour: u32) -> Self {
        Self {
            allocator: BalancedAllocator::new(default_start_hour, default_end_hour),
        }
    }
}

impl Strategy for BalancedStrategy {
    fn name(&self) -> &'static str {
        "balanced"
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
