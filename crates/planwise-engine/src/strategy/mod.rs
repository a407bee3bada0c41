//! Optimization strategies.
//!
//! Every strategy runs the same skeleton: seed a ledger from the context
//! tasks whose commitments must be respected, order the candidates, then
//! attempt one allocation per candidate, collecting failures instead of
//! aborting. What varies is the ordering rule and the allocator choice.

use tracing::{info, warn};

use planwise_core::{SchedulerError, Task};

use crate::alloc::{AllocationError, Allocator};
use crate::ledger::Ledger;
use crate::params::OptimizeParams;
use crate::validate::counts_toward_ledger;

mod balanced;
mod greedy;
mod monte_carlo;
mod variants;

pub use balanced::BalancedStrategy;
pub use greedy::GreedyStrategy;
pub use monte_carlo::{MonteCarloStrategy, NUM_SIMULATIONS};
pub use variants::{DeadlinePackedStrategy, HardDeadlineStrategy, ShortTasksFirstStrategy};

/// A task the run could not place, with the allocator's reason.
#[derive(Clone, Debug)]
pub struct SchedulingFailure {
    pub task: Task,
    pub reason: String,
}

/// Outcome of one strategy invocation.
#[derive(Clone, Debug, Default)]
pub struct OptimizeResult {
    /// Successfully scheduled task clones, in allocation order
    pub tasks: Vec<Task>,
    /// Final state of the run ledger
    pub ledger: Ledger,
    /// Tasks that could not be placed
    pub failures: Vec<SchedulingFailure>,
}

impl OptimizeResult {
    /// Hours newly planned by this run.
    pub fn total_hours(&self) -> f64 {
        self.tasks.iter().map(Task::allocated_hours).sum()
    }
}

/// Orders a candidate set and drives an [`Allocator`] over it.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Machine name, as known to the factory.
    fn name(&self) -> &'static str;

    /// Plan `candidates` against the commitments held by `context_tasks`.
    fn optimize(
        &self,
        candidates: &[Task],
        context_tasks: &[Task],
        params: &OptimizeParams,
    ) -> Result<OptimizeResult, SchedulerError>;
}

/// Ledger pre-loaded with every context commitment that still occupies
/// future capacity.
pub(crate) fn seeded_ledger(context_tasks: &[Task]) -> Ledger {
    let mut ledger = Ledger::new();
    for task in context_tasks {
        if counts_toward_ledger(task) {
            ledger.seed(task);
        }
    }
    ledger
}

/// Allocate each task in order; infeasible tasks become failures, fatal
/// errors abort.
pub(crate) fn run_allocation_pass(
    ordered: &[Task],
    allocator: &dyn Allocator,
    ledger: &mut Ledger,
    params: &OptimizeParams,
) -> Result<(Vec<Task>, Vec<SchedulingFailure>), SchedulerError> {
    let mut scheduled = Vec::new();
    let mut failures = Vec::new();
    for task in ordered {
        match allocator.allocate(task, ledger, params) {
            Ok(planned) => scheduled.push(planned),
            Err(AllocationError::Infeasible(reason)) => {
                warn!(task = task.name.as_str(), reason = reason.as_str(), "allocation failed");
                failures.push(SchedulingFailure {
                    task: task.clone(),
                    reason,
                });
            }
            Err(AllocationError::Fatal(err)) => return Err(err),
        }
    }
    Ok((scheduled, failures))
}

/// The shared strategy skeleton for deterministic orderings.
pub(crate) fn run_ordered_strategy(
    name: &'static str,
    ordered: Vec<Task>,
    context_tasks: &[Task],
    allocator: &dyn Allocator,
    params: &OptimizeParams,
) -> Result<OptimizeResult, SchedulerError> {
    let mut ledger = seeded_ledger(context_tasks);
    let (tasks, failures) = run_allocation_pass(&ordered, allocator, &mut ledger, params)?;
    info!(
        strategy = name,
        scheduled = tasks.len(),
        failed = failures.len(),
        "optimization pass complete"
    );
    Ok(OptimizeResult {
        tasks,
        ledger,
        failures,
    })
}
