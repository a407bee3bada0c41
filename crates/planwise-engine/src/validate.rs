//! Schedulability validation and workload-seeding rules.

use std::collections::BTreeMap;

use planwise_core::{SchedulerError, Task, TaskId};

/// Outcome of validating a caller-supplied candidate list.
#[derive(Clone, Debug, Default)]
pub struct SchedulabilityReport {
    /// Tasks cleared for (re)planning, in input order
    pub schedulable: Vec<Task>,
    /// Per-task reasons for everything that was rejected
    pub rejected: BTreeMap<TaskId, String>,
}

/// Validate explicitly requested task ids against the loaded task set.
///
/// Every id must exist (`TaskNotFound` lists all misses at once). When
/// every requested task is rejected the caller gets `NoSchedulableTasks`
/// with the full reason map; a mixed set filters silently and reports the
/// rejects alongside the survivors.
pub fn validate_and_filter(
    task_ids: &[TaskId],
    all_tasks: &[Task],
    force_override: bool,
) -> Result<SchedulabilityReport, SchedulerError> {
    let missing: Vec<TaskId> = task_ids
        .iter()
        .copied()
        .filter(|&id| !all_tasks.iter().any(|task| task.id == Some(id)))
        .collect();
    if !missing.is_empty() {
        return Err(SchedulerError::TaskNotFound { ids: missing });
    }

    let mut report = SchedulabilityReport::default();
    for &id in task_ids {
        let task = all_tasks
            .iter()
            .find(|task| task.id == Some(id))
            .ok_or_else(|| SchedulerError::TaskNotFound { ids: vec![id] })?;
        match task.unschedulable_reason(force_override) {
            None => report.schedulable.push(task.clone()),
            Some(reason) => {
                report.rejected.insert(id, reason);
            }
        }
    }

    if report.schedulable.is_empty() {
        return Err(SchedulerError::NoSchedulableTasks {
            reasons: report.rejected,
        });
    }
    Ok(report)
}

/// Every schedulable task in the set; the candidate list when the caller
/// names no ids.
pub fn all_schedulable(all_tasks: &[Task], force_override: bool) -> Vec<Task> {
    all_tasks
        .iter()
        .filter(|task| task.is_schedulable(force_override))
        .cloned()
        .collect()
}

/// Whether a context task's existing allocations seed the run ledger.
///
/// Fixed and in-progress work always counts; pending planned work counts
/// as long as it is not itself being re-planned (the caller guarantees
/// that by excluding candidates from the context set).
pub fn counts_toward_ledger(task: &Task) -> bool {
    task.should_count_in_workload()
        && task.planned_start.is_some()
        && task.estimated_duration.is_some()
        && !task.daily_allocations.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planwise_core::TaskStatus;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn fixture_tasks() -> Vec<Task> {
        vec![
            Task::new("schedulable").with_id(1).priority(5).estimated_hours(5.0),
            Task::new("scheduled")
                .with_id(2)
                .priority(3)
                .estimated_hours(3.0)
                .planned_window(dt(2025, 1, 1, 9), dt(2025, 1, 1, 18)),
            Task::new("fixed")
                .with_id(3)
                .priority(8)
                .estimated_hours(2.0)
                .fixed(),
            Task::new("completed")
                .with_id(4)
                .status(TaskStatus::Completed)
                .estimated_hours(4.0),
            Task::new("no estimate").with_id(5),
            Task::new("in progress")
                .with_id(6)
                .status(TaskStatus::InProgress)
                .estimated_hours(3.0),
            Task::new("archived")
                .with_id(7)
                .estimated_hours(2.0)
                .archived(),
        ]
    }

    #[test]
    fn single_schedulable_task_passes() {
        let report = validate_and_filter(&[1], &fixture_tasks(), false).unwrap();
        assert_eq!(report.schedulable.len(), 1);
        assert_eq!(report.schedulable[0].id, Some(1));
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn mixed_set_filters_and_reports() {
        let report = validate_and_filter(&[1, 5], &fixture_tasks(), false).unwrap();
        assert_eq!(report.schedulable.len(), 1);
        assert_eq!(report.schedulable[0].id, Some(1));
        assert!(report.rejected[&5].contains("duration"));
    }

    #[test]
    fn scheduled_task_needs_force_override() {
        let err = validate_and_filter(&[2], &fixture_tasks(), false).unwrap_err();
        assert!(matches!(err, SchedulerError::NoSchedulableTasks { .. }));

        let report = validate_and_filter(&[2], &fixture_tasks(), true).unwrap();
        assert_eq!(report.schedulable[0].id, Some(2));
    }

    #[test]
    fn missing_ids_are_reported_together() {
        let err = validate_and_filter(&[998, 999], &fixture_tasks(), false).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::TaskNotFound {
                ids: vec![998, 999]
            }
        );
    }

    #[test]
    fn all_rejected_is_an_error_with_reasons() {
        let err = validate_and_filter(&[3, 4, 5], &fixture_tasks(), false).unwrap_err();
        let SchedulerError::NoSchedulableTasks { reasons } = err else {
            panic!("expected NoSchedulableTasks, got {err:?}");
        };
        assert_eq!(reasons.len(), 3);
        assert!(reasons[&3].contains("fixed"));
        assert!(reasons[&4].contains("COMPLETED"));
        assert!(reasons[&5].to_lowercase().contains("duration"));
    }

    #[test]
    fn fixed_rejected_even_with_force() {
        let err = validate_and_filter(&[3], &fixture_tasks(), true).unwrap_err();
        let SchedulerError::NoSchedulableTasks { reasons } = err else {
            panic!("expected NoSchedulableTasks, got {err:?}");
        };
        assert!(reasons[&3].contains("fixed"));
    }

    #[test]
    fn empty_task_set_means_not_found() {
        let err = validate_and_filter(&[1], &[], false).unwrap_err();
        assert!(matches!(err, SchedulerError::TaskNotFound { .. }));
    }

    #[test]
    fn all_schedulable_scans_the_whole_set() {
        let candidates = all_schedulable(&fixture_tasks(), false);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, Some(1));

        // force also admits the already-planned pending task
        let forced = all_schedulable(&fixture_tasks(), true);
        let ids: Vec<_> = forced.iter().map(|t| t.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    // ------------------------------------------------------------------
    // Ledger seeding rule
    // ------------------------------------------------------------------

    fn planned_task() -> Task {
        Task::new("planned")
            .with_id(1)
            .estimated_hours(12.0)
            .planned_window(dt(2025, 10, 20, 9), dt(2025, 10, 21, 18))
            .allocations(
                [
                    (NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(), 6.0),
                    (NaiveDate::from_ymd_opt(2025, 10, 21).unwrap(), 6.0),
                ]
                .into_iter()
                .collect(),
            )
    }

    #[test]
    fn planned_pending_task_counts() {
        assert!(counts_toward_ledger(&planned_task()));
    }

    #[test]
    fn unplanned_task_does_not_count() {
        let task = Task::new("unplanned").with_id(1).estimated_hours(10.0);
        assert!(!counts_toward_ledger(&task));
    }

    #[test]
    fn task_without_duration_does_not_count() {
        let mut task = planned_task();
        task.estimated_duration = None;
        assert!(!counts_toward_ledger(&task));
    }

    #[test]
    fn finished_task_does_not_count() {
        let task = planned_task().status(TaskStatus::Completed);
        assert!(!counts_toward_ledger(&task));
    }

    #[test]
    fn archived_task_does_not_count() {
        let task = planned_task().archived();
        assert!(!counts_toward_ledger(&task));
    }

    #[test]
    fn fixed_and_in_progress_tasks_count() {
        assert!(counts_toward_ledger(&planned_task().fixed()));
        assert!(counts_toward_ledger(
            &planned_task().status(TaskStatus::InProgress)
        ));
    }
}
