//! The simulate use case: what-if scheduling without persistence.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use planwise_core::{
    Clock, SchedulerConfig, SchedulerError, Task, TaskId, TaskRepository, WorkCalendar,
};

use crate::factory::StrategyFactory;
use crate::params::OptimizeParams;
use crate::validate::all_schedulable;

/// Id given to the virtual task; negative so it can never collide with a
/// repository-assigned id.
pub const VIRTUAL_TASK_ID: TaskId = -1;

/// Description of the hypothetical task to place.
#[derive(Clone, Debug)]
pub struct SimulateRequest {
    pub name: String,
    pub estimated_duration: f64,
    pub priority: Option<i32>,
    pub deadline: Option<NaiveDateTime>,
    pub depends_on: Vec<TaskId>,
    pub tags: BTreeSet<String>,
    pub max_hours_per_day: Option<f64>,
    pub rng_seed: Option<u64>,
}

impl SimulateRequest {
    pub fn new(name: impl Into<String>, estimated_duration: f64) -> Self {
        Self {
            name: name.into(),
            estimated_duration,
            priority: None,
            deadline: None,
            depends_on: Vec::new(),
            tags: BTreeSet::new(),
            max_hours_per_day: None,
            rng_seed: None,
        }
    }
}

/// Predicted schedule for the virtual task, plus workload analysis.
#[derive(Clone, Debug)]
pub struct SimulationOutcome {
    pub is_schedulable: bool,
    pub planned_start: Option<NaiveDateTime>,
    pub planned_end: Option<NaiveDateTime>,
    pub failure_reason: Option<String>,
    pub daily_allocations: BTreeMap<NaiveDate, f64>,
    pub peak_workload: f64,
    pub peak_date: Option<NaiveDate>,
    pub average_workload: f64,
    pub total_workload_days: usize,
    pub best_algorithm: Option<String>,
    pub successful_algorithms: usize,
    pub total_algorithms_tested: usize,
}

/// Tries every available algorithm against the current task set plus a
/// virtual task, and reports the earliest completion found. Never writes
/// to the repository.
pub struct SimulateSchedule<'a, R: TaskRepository> {
    repository: &'a R,
    config: SchedulerConfig,
    calendar: WorkCalendar,
    clock: &'a dyn Clock,
}

impl<'a, R: TaskRepository> SimulateSchedule<'a, R> {
    pub fn new(
        repository: &'a R,
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

    pub fn execute(&self, request: &SimulateRequest) -> Result<SimulationOutcome, SchedulerError> {
        let virtual_task = self.virtual_task(request);

        let mut all_tasks = self.repository.get_all();
        all_tasks.push(virtual_task);

        // Existing schedules are respected in simulation: no force.
        let candidates = all_schedulable(&all_tasks, false);
        let candidate_ids: BTreeSet<TaskId> =
            candidates.iter().filter_map(|task| task.id).collect();
        let context_tasks: Vec<Task> = all_tasks
            .into_iter()
            .filter(|task| task.id.map_or(true, |id| !candidate_ids.contains(&id)))
            .collect();

        let now = self.clock.now();
        let algorithms = StrategyFactory::list_available();
        let total_algorithms_tested = algorithms.len();

        let mut successes: Vec<(&'static str, Task)> = Vec::new();
        let mut first_failure_reason: Option<String> = None;

        for name in algorithms {
            let strategy = StrategyFactory::create(
                name,
                self.config.default_start_hour,
                self.config.default_end_hour,
            )?;
            let mut params = OptimizeParams::new(
                now,
                request
                    .max_hours_per_day
                    .unwrap_or(self.config.max_hours_per_day),
                now,
            )
            .calendar(self.calendar.clone());
            params.rng_seed = request.rng_seed;

            let result = strategy.optimize(&candidates, &context_tasks, &params)?;

            match result
                .tasks
                .iter()
                .find(|task| task.id == Some(VIRTUAL_TASK_ID))
            {
                Some(planned) => successes.push((name, planned.clone())),
                None => {
                    if first_failure_reason.is_none() {
                        first_failure_reason = result
                            .failures
                            .iter()
                            .find(|failure| failure.task.id == Some(VIRTUAL_TASK_ID))
                            .map(|failure| failure.reason.clone());
                    }
                }
            }
            debug!(algorithm = name, "simulation pass done");
        }

        let successful_algorithms = successes.len();
        let best = successes
            .into_iter()
            .min_by_key(|(_, task)| task.planned_end);

        match best {
            Some((algorithm, task)) => Ok(Self::outcome_for(
                &task,
                Some(algorithm.to_string()),
                successful_algorithms,
                total_algorithms_tested,
            )),
            None => Ok(SimulationOutcome {
                is_schedulable: false,
                planned_start: None,
                planned_end: None,
                failure_reason: Some(first_failure_reason.unwrap_or_else(|| {
                    "no algorithm could schedule this task".to_string()
                })),
                daily_allocations: BTreeMap::new(),
                peak_workload: 0.0,
                peak_date: None,
                average_workload: 0.0,
                total_workload_days: 0,
                best_algorithm: None,
                successful_algorithms: 0,
                total_algorithms_tested,
            }),
        }
    }

    fn virtual_task(&self, request: &SimulateRequest) -> Task {
        let mut task = Task::new(request.name.clone())
            .with_id(VIRTUAL_TASK_ID)
            .priority(request.priority.unwrap_or(self.config.default_priority))
            .estimated_hours(request.estimated_duration);
        task.deadline = request.deadline;
        task.depends_on = request.depends_on.clone();
        task.tags = request.tags.clone();
        task
    }

    fn outcome_for(
        task: &Task,
        best_algorithm: Option<String>,
        successful_algorithms: usize,
        total_algorithms_tested: usize,
    ) -> SimulationOutcome {
        let allocations = &task.daily_allocations;
        let total_hours: f64 = allocations.values().sum();
        let total_workload_days = allocations.len();
        let peak = allocations
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));

        SimulationOutcome {
            is_schedulable: true,
            planned_start: task.planned_start,
            planned_end: task.planned_end,
            failure_reason: None,
            daily_allocations: allocations.clone(),
            peak_workload: peak.map_or(0.0, |(_, &hours)| hours),
            peak_date: peak.map(|(&date, _)| date),
            average_workload: if total_workload_days > 0 {
                total_hours / total_workload_days as f64
            } else {
                0.0
            },
            total_workload_days,
            best_algorithm,
            successful_algorithms,
            total_algorithms_tested,
        }
    }
}
