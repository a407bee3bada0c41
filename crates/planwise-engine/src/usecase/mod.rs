//! Application use cases: the engine's public entry points.

use thiserror::Error;

use planwise_core::{SchedulerError, StoreError};

mod optimize;
mod simulate;

pub use optimize::{OptimizeRequest, OptimizeSummary, OptimizeTasks};
pub use simulate::{SimulateRequest, SimulateSchedule, SimulationOutcome, VIRTUAL_TASK_ID};

/// Errors surfaced by a use case: a scheduling problem or a repository
/// failure while loading/persisting.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("repository error: {0}")]
    Store(#[from] StoreError),
}
