//! Error taxonomy shared across the workspace.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::task::TaskId;

/// Scheduling error.
///
/// Capacity problems during allocation are *not* errors; they are recorded
/// as per-task failures in the optimization result. These variants cover
/// caller mistakes (`TaskNotFound`, `UnknownAlgorithm`, ...) and invariant
/// violations (`Internal`), which abort the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("task(s) not found: {ids:?}")]
    TaskNotFound { ids: Vec<TaskId> },

    #[error("task {id} is not schedulable: {reason}")]
    TaskNotSchedulable { id: TaskId, reason: String },

    #[error("no schedulable tasks among {:?}", .reasons.keys().collect::<Vec<_>>())]
    NoSchedulableTasks { reasons: BTreeMap<TaskId, String> },

    #[error("dependency cycle detected: {task_ids:?}")]
    DependencyCycle { task_ids: Vec<TaskId> },

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Repository error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid task data: {0}")]
    InvalidData(String),
}
