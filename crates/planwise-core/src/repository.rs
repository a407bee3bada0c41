//! Task repository contract.
//!
//! The engine depends on this trait only; SQL, JSON and in-memory
//! implementations all live elsewhere. Reads are served from the
//! repository's loaded state; `save_all` is the single mutation entry
//! point, a bulk upsert that assigns ids and maintains timestamps.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::task::{Task, TaskId, TaskStatus};

/// Predicates for filtered reads.
///
/// Unset fields do not constrain the result. `start_date`/`end_date`
/// select tasks whose planned window overlaps the range.
#[derive(Clone, Debug, Default)]
pub struct TaskFilter {
    pub include_archived: bool,
    pub status: Option<TaskStatus>,
    pub tags: Vec<String>,
    pub match_all_tags: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn match_all_tags(mut self) -> Self {
        self.match_all_tags = true;
        self
    }

    pub fn planned_between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Whether a task satisfies every set predicate.
    pub fn matches(&self, task: &Task) -> bool {
        if task.is_archived && !self.include_archived {
            return false;
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let mut hits = self.tags.iter().filter(|t| task.tags.contains(*t));
            let matched = if self.match_all_tags {
                hits.count() == self.tags.len()
            } else {
                hits.next().is_some()
            };
            if !matched {
                return false;
            }
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let (Some(start), Some(end)) = (task.planned_start, task.planned_end) else {
                return false;
            };
            if let Some(filter_end) = self.end_date {
                if start.date() > filter_end {
                    return false;
                }
            }
            if let Some(filter_start) = self.start_date {
                if end.date() < filter_start {
                    return false;
                }
            }
        }
        true
    }
}

/// Synchronous task store.
pub trait TaskRepository {
    /// Every task, including archived ones.
    fn get_all(&self) -> Vec<Task>;

    fn get_by_id(&self, id: TaskId) -> Option<Task>;

    /// Bulk lookup; missing ids are simply absent from the result.
    fn get_by_ids(&self, ids: &[TaskId]) -> BTreeMap<TaskId, Task> {
        ids.iter()
            .filter_map(|&id| self.get_by_id(id).map(|task| (id, task)))
            .collect()
    }

    /// Bulk upsert. Tasks without an id are assigned one; `created_at` is
    /// stamped on insert and `updated_at` on every write. Returns the
    /// persisted tasks in input order.
    fn save_all(&mut self, tasks: &[Task]) -> Result<Vec<Task>, StoreError>;

    fn count_tasks(&self) -> usize;

    fn count_tasks_with_tags(&self) -> usize;

    /// Total planned hours per date over `start..=end`, optionally
    /// restricted to `task_ids`, counting only tasks whose workload is
    /// still pending (see [`Task::should_count_in_workload`]).
    fn daily_workload_totals(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        task_ids: Option<&[TaskId]>,
    ) -> BTreeMap<NaiveDate, f64> {
        let mut totals = BTreeMap::new();
        for task in self.get_all() {
            if !task.should_count_in_workload() {
                continue;
            }
            if let Some(ids) = task_ids {
                match task.id {
                    Some(id) if ids.contains(&id) => {}
                    _ => continue,
                }
            }
            for (&date, &hours) in &task.daily_allocations {
                if date >= start && date <= end {
                    *totals.entry(date).or_insert(0.0) += hours;
                }
            }
        }
        totals
    }

    /// Filtered read for non-core consumers (list views, exports).
    fn find(&self, filter: &TaskFilter) -> Vec<Task> {
        self.get_all()
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect()
    }
}
