//! The optimize use case: load, validate, schedule, persist, summarize.

use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use planwise_core::{Clock, SchedulerConfig, Task, TaskId, TaskRepository, WorkCalendar};

use crate::factory::StrategyFactory;
use crate::params::OptimizeParams;
use crate::strategy::SchedulingFailure;
use crate::usecase::UseCaseError;
use crate::validate::{all_schedulable, validate_and_filter};

/// Caller inputs for one optimization run. Unset overrides fall back to
/// the injected configuration; an empty id list means "optimize every
/// schedulable task".
#[derive(Clone, Debug, Default)]
pub struct OptimizeRequest {
    pub task_ids: Vec<TaskId>,
    pub algorithm: Option<String>,
    pub force_override: bool,
    pub max_hours_per_day: Option<f64>,
    pub start_date: Option<NaiveDateTime>,
    pub rng_seed: Option<u64>,
}

/// What one run did.
#[derive(Clone, Debug)]
pub struct OptimizeSummary {
    /// Tasks given a new plan, as persisted
    pub scheduled_tasks: Vec<Task>,
    /// Tasks the strategy could not place; not persisted
    pub failed_tasks: Vec<SchedulingFailure>,
    /// Requested tasks rejected before scheduling, with reasons
    pub unschedulable: BTreeMap<TaskId, String>,
    /// Hours newly planned
    pub total_hours: f64,
    /// Earliest planned start over the scheduled tasks
    pub start_date: Option<NaiveDateTime>,
    /// Latest planned end over the scheduled tasks
    pub end_date: Option<NaiveDateTime>,
    /// Algorithm that produced the schedule
    pub algorithm: String,
}

/// Runs the selected strategy over the repository's tasks and persists
/// the resulting plans in one bulk write.
pub struct OptimizeTasks<'a, R: TaskRepository> {
    repository: &'a mut R,
    config: SchedulerConfig,
    calendar: WorkCalendar,
    clock: &'a dyn Clock,
}

impl<'a, R: TaskRepository> OptimizeTasks<'a, R> {
    pub fn new(
        repository: &'a mut R,
        config: SchedulerConfig,
        calendar: WorkCalendar,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            repository,
            config,
            calendar,
            clock,
        }
    }

    pub fn execute(&mut self, request: &OptimizeRequest) -> Result<OptimizeSummary, UseCaseError> {
        let all_tasks = self.repository.get_all();
        let now = self.clock.now();

        let (candidates, unschedulable) = if request.task_ids.is_empty() {
            (all_schedulable(&all_tasks, request.force_override), BTreeMap::new())
        } else {
            let report =
                validate_and_filter(&request.task_ids, &all_tasks, request.force_override)?;
            (report.schedulable, report.rejected)
        };

        let candidate_ids: BTreeSet<TaskId> =
            candidates.iter().filter_map(|task| task.id).collect();
        let context_tasks: Vec<Task> = all_tasks
            .into_iter()
            .filter(|task| task.id.map_or(true, |id| !candidate_ids.contains(&id)))
            .collect();

        let algorithm = request
            .algorithm
            .clone()
            .unwrap_or_else(|| self.config.default_algorithm.clone());
        let strategy = StrategyFactory::create(
            &algorithm,
            self.config.default_start_hour,
            self.config.default_end_hour,
        )?;

        let mut params = OptimizeParams::new(
            request.start_date.unwrap_or(now),
            request
                .max_hours_per_day
                .unwrap_or(self.config.max_hours_per_day),
            now,
        )
        .force_override(request.force_override)
        .calendar(self.calendar.clone());
        params.rng_seed = request.rng_seed;

        let result = strategy.optimize(&candidates, &context_tasks, &params)?;

        // One bulk write; failed tasks are reported, never persisted.
        let scheduled_tasks = if result.tasks.is_empty() {
            Vec::new()
        } else {
            self.repository.save_all(&result.tasks)?
        };

        let total_hours = result.total_hours();
        let start_date = scheduled_tasks.iter().filter_map(|t| t.planned_start).min();
        let end_date = scheduled_tasks.iter().filter_map(|t| t.planned_end).max();

        info!(
            algorithm = algorithm.as_str(),
            scheduled = scheduled_tasks.len(),
            failed = result.failures.len(),
            rejected = unschedulable.len(),
            total_hours,
            "optimize run complete"
        );

        Ok(OptimizeSummary {
            scheduled_tasks,
            failed_tasks: result.failures,
            unschedulable,
            total_hours,
            start_date,
            end_date,
            algorithm,
        })
    }
}
