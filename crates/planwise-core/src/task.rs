//! Task entity and its scheduling predicates.
//!
//! A [`Task`] is the unit of scheduling: the optimizer reads its duration,
//! priority, deadline and dependencies, and writes back a planned window
//! plus a per-day hour breakdown. The serde form of this struct is the
//! canonical import/export format (a flat JSON array of tasks with
//! ISO-8601 timestamps and `YYYY-MM-DD` allocation keys).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SchedulerError;

/// Unique identifier for a task, assigned by the repository on first persist.
pub type TaskId = i64;

/// Lifecycle status of a task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Canceled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
            TaskStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// A schedulable unit of work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identity; `None` until first persisted
    #[serde(default)]
    pub id: Option<TaskId>,
    /// Human-readable name
    pub name: String,
    /// Scheduling priority (higher = more important)
    pub priority: i32,
    /// Free-form labels
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Ids of tasks that must be placed earlier in any schedule
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
    /// Lifecycle status
    #[serde(default)]
    pub status: TaskStatus,
    /// Estimated work in hours; required for scheduling
    #[serde(default)]
    pub estimated_duration: Option<f64>,
    /// Latest acceptable finish
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
    /// Planned window start; present iff `planned_end` is
    #[serde(default)]
    pub planned_start: Option<NaiveDateTime>,
    /// Planned window end
    #[serde(default)]
    pub planned_end: Option<NaiveDateTime>,
    /// When work actually began
    #[serde(default)]
    pub actual_start: Option<NaiveDateTime>,
    /// When work actually completed
    #[serde(default)]
    pub actual_end: Option<NaiveDateTime>,
    /// Explicit override of the actually worked hours
    #[serde(default)]
    pub actual_duration: Option<f64>,
    /// Planned hours per working date; sums to `estimated_duration` on a
    /// successfully scheduled task
    #[serde(default)]
    pub daily_allocations: BTreeMap<NaiveDate, f64>,
    /// Recorded hours per date; read-only to the optimizer
    #[serde(default)]
    pub actual_daily_hours: BTreeMap<NaiveDate, f64>,
    /// When true the planned window and allocations are immutable and
    /// always count against the daily budget
    #[serde(default)]
    pub is_fixed: bool,
    /// Archived tasks are never schedulable
    #[serde(default)]
    pub is_archived: bool,
    /// Maintained by the repository
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Maintained by the repository
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// Create a new pending task with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            priority: 3,
            tags: BTreeSet::new(),
            depends_on: Vec::new(),
            status: TaskStatus::Pending,
            estimated_duration: None,
            deadline: None,
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
            actual_duration: None,
            daily_allocations: BTreeMap::new(),
            actual_daily_hours: BTreeMap::new(),
            is_fixed: false,
            is_archived: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the id
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the status
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the estimated duration in hours
    pub fn estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_duration = Some(hours);
        self
    }

    /// Set the deadline
    pub fn deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set both ends of the planned window
    pub fn planned_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    /// Add a dependency on another task
    pub fn depends_on(mut self, predecessor: TaskId) -> Self {
        self.depends_on.push(predecessor);
        self
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set the per-day allocation map
    pub fn allocations(mut self, allocations: BTreeMap<NaiveDate, f64>) -> Self {
        self.daily_allocations = allocations;
        self
    }

    /// Mark the plan as immutable
    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }

    /// Archive the task
    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    // ========================================================================
    // Scheduling Predicates
    // ========================================================================

    /// A task is finished once it reaches a terminal status.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Canceled)
    }

    /// Whether the optimizer is allowed to (re)plan this task now.
    ///
    /// `force_override` lifts only the "already scheduled" restriction;
    /// archived and fixed tasks stay off-limits regardless.
    pub fn is_schedulable(&self, force_override: bool) -> bool {
        self.unschedulable_reason(force_override).is_none()
    }

    /// Why the task cannot be scheduled, or `None` when it can.
    ///
    /// The checks run in a fixed order so callers get a stable reason for a
    /// given task state.
    pub fn unschedulable_reason(&self, force_override: bool) -> Option<String> {
        if self.is_archived {
            return Some("task is archived".into());
        }
        if self.status != TaskStatus::Pending {
            return Some(format!(
                "status is {}; only PENDING tasks can be scheduled",
                self.status
            ));
        }
        match self.estimated_duration {
            None => return Some("no estimated duration".into()),
            Some(hours) if hours <= 0.0 => {
                return Some("estimated duration must be positive".into())
            }
            Some(_) => {}
        }
        if self.is_fixed {
            return Some("task is fixed and cannot be rescheduled".into());
        }
        if self.planned_start.is_some() && !force_override {
            return Some("already scheduled; use force override to replace the plan".into());
        }
        None
    }

    /// Like [`Task::unschedulable_reason`], but for callers that demanded
    /// this specific task be scheduled: failure is an error.
    pub fn validate_schedulable(&self, force_override: bool) -> Result<(), SchedulerError> {
        let Some(id) = self.id else {
            return Err(SchedulerError::Internal(format!(
                "task '{}' has no id",
                self.name
            )));
        };
        match self.unschedulable_reason(force_override) {
            Some(reason) => Err(SchedulerError::TaskNotSchedulable { id, reason }),
            None => Ok(()),
        }
    }

    /// Whether this task's planned hours belong in workload accounting.
    ///
    /// Finished and archived tasks no longer occupy future capacity.
    pub fn should_count_in_workload(&self) -> bool {
        !self.is_archived
            && matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress)
    }

    /// Sum of the planned per-day hours.
    pub fn allocated_hours(&self) -> f64 {
        self.daily_allocations.values().sum()
    }

    /// Clear the planned window and allocations.
    pub fn clear_plan(&mut self) {
        self.planned_start = None;
        self.planned_end = None;
        self.daily_allocations.clear();
    }
}
