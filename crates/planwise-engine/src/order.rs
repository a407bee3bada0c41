//! Candidate ordering and dependency arrangement.
//!
//! Strategies share one deterministic comparator (priority descending,
//! deadline ascending with absent deadlines last, id ascending) and one
//! topological pre-pass so a dependency is always placed before its
//! dependents. Dependencies on tasks outside the candidate set do not
//! constrain the ordering; the set being optimized is self-contained.

use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use planwise_core::{SchedulerError, Task, TaskId};

/// The deterministic scheduling comparator.
pub fn scheduling_order(a: &Task, b: &Task) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| match (a.deadline, b.deadline) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Comparator for the short-tasks-first family: ascending estimated
/// duration, ties broken by [`scheduling_order`].
pub fn shortest_first_order(a: &Task, b: &Task) -> Ordering {
    let da = a.estimated_duration.unwrap_or(f64::MAX);
    let db = b.estimated_duration.unwrap_or(f64::MAX);
    da.partial_cmp(&db)
        .unwrap_or(Ordering::Equal)
        .then_with(|| scheduling_order(a, b))
}

struct DependencyGraph {
    /// successors[i] lists indices that depend on task i
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl DependencyGraph {
    fn build(tasks: &[Task]) -> Self {
        let index_of: HashMap<TaskId, usize> = tasks
            .iter()
            .enumerate()
            .filter_map(|(i, task)| task.id.map(|id| (id, i)))
            .collect();

        let mut successors = vec![Vec::new(); tasks.len()];
        let mut in_degree = vec![0; tasks.len()];
        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.depends_on {
                if let Some(&pred) = index_of.get(dep) {
                    successors[pred].push(i);
                    in_degree[i] += 1;
                }
            }
        }
        Self {
            successors,
            in_degree,
        }
    }
}

/// Arrange `tasks` so every dependency precedes its dependents, keeping
/// the incoming order among unrelated tasks (Kahn's algorithm with the
/// smallest ready position first).
///
/// A cycle within the set aborts with [`SchedulerError::DependencyCycle`]
/// naming the tasks involved.
pub fn topological_order(tasks: Vec<Task>) -> Result<Vec<Task>, SchedulerError> {
    let graph = DependencyGraph::build(&tasks);
    let mut in_degree = graph.in_degree;
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(tasks.len());
    while let Some(&i) = ready.iter().next() {
        ready.remove(&i);
        order.push(i);
        for &succ in &graph.successors[i] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    if order.len() < tasks.len() {
        let mut task_ids: Vec<TaskId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg > 0)
            .filter_map(|(i, _)| tasks[i].id)
            .collect();
        task_ids.sort_unstable();
        return Err(SchedulerError::DependencyCycle { task_ids });
    }

    let mut slots: Vec<Option<Task>> = tasks.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .map(|i| slots[i].take().expect("each index visited once"))
        .collect())
}

/// A uniformly random linear extension of the dependency order: at each
/// step one of the currently unblocked tasks is drawn at random.
pub fn random_linear_extension<R: Rng>(tasks: &[Task], rng: &mut R) -> Vec<Task> {
    let graph = DependencyGraph::build(tasks);
    let mut in_degree = graph.in_degree;
    let mut ready: Vec<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(tasks.len());
    while !ready.is_empty() {
        let pick = rng.gen_range(0..ready.len());
        let i = ready.swap_remove(pick);
        order.push(tasks[i].clone());
        for &succ in &graph.successors[i] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.push(succ);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dt(d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, d)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn comparator_prefers_priority_then_deadline_then_id() {
        let mut tasks = vec![
            Task::new("late deadline").with_id(1).priority(5).deadline(dt(30)),
            Task::new("no deadline").with_id(2).priority(5),
            Task::new("high priority").with_id(3).priority(9),
            Task::new("early deadline").with_id(4).priority(5).deadline(dt(21)),
            Task::new("tie on everything").with_id(5).priority(5).deadline(dt(21)),
        ];
        tasks.sort_by(scheduling_order);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.unwrap()).collect();
        assert_eq!(ids, vec![3, 4, 5, 1, 2]);
    }

    #[test]
    fn shortest_first_breaks_ties_with_scheduling_order() {
        let mut tasks = vec![
            Task::new("long").with_id(1).priority(9).estimated_hours(20.0),
            Task::new("short").with_id(2).priority(1).estimated_hours(2.0),
            Task::new("short urgent").with_id(3).priority(5).estimated_hours(2.0),
        ];
        tasks.sort_by(shortest_first_order);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.unwrap()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn topological_order_places_dependencies_first() {
        let tasks = vec![
            Task::new("c").with_id(3).depends_on(2),
            Task::new("b").with_id(2).depends_on(1),
            Task::new("a").with_id(1),
        ];
        let ordered = topological_order(tasks).unwrap();
        let ids: Vec<_> = ordered.iter().map(|t| t.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn topological_order_keeps_unrelated_order() {
        let tasks = vec![
            Task::new("first").with_id(10),
            Task::new("second").with_id(20),
            Task::new("third").with_id(30),
        ];
        let ordered = topological_order(tasks).unwrap();
        let ids: Vec<_> = ordered.iter().map(|t| t.id.unwrap()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn dependencies_outside_the_set_are_ignored() {
        let tasks = vec![Task::new("depends on absent").with_id(1).depends_on(99)];
        let ordered = topological_order(tasks).unwrap();
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn direct_cycle_is_detected() {
        let tasks = vec![
            Task::new("a").with_id(1).depends_on(2),
            Task::new("b").with_id(2).depends_on(1),
        ];
        let err = topological_order(tasks).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::DependencyCycle {
                task_ids: vec![1, 2]
            }
        );
    }

    #[test]
    fn three_node_cycle_is_detected() {
        let tasks = vec![
            Task::new("a").with_id(1).depends_on(3),
            Task::new("b").with_id(2).depends_on(1),
            Task::new("c").with_id(3).depends_on(2),
        ];
        let err = topological_order(tasks).unwrap_err();
        assert!(matches!(err, SchedulerError::DependencyCycle { task_ids } if task_ids.len() == 3));
    }

    #[test]
    fn random_extension_respects_dependencies() {
        let tasks = vec![
            Task::new("a").with_id(1),
            Task::new("b").with_id(2).depends_on(1),
            Task::new("c").with_id(3).depends_on(2),
            Task::new("d").with_id(4),
            Task::new("e").with_id(5).depends_on(4),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let order = random_linear_extension(&tasks, &mut rng);
            let position: HashMap<TaskId, usize> = order
                .iter()
                .enumerate()
                .map(|(i, t)| (t.id.unwrap(), i))
                .collect();
            assert!(position[&1] < position[&2]);
            assert!(position[&2] < position[&3]);
            assert!(position[&4] < position[&5]);
        }
    }

    #[test]
    fn random_extension_is_reproducible_with_a_seed() {
        let tasks: Vec<Task> = (1..=8).map(|i| Task::new(format!("t{i}")).with_id(i)).collect();
        let a: Vec<_> = random_linear_extension(&tasks, &mut StdRng::seed_from_u64(42))
            .iter()
            .map(|t| t.id.unwrap())
            .collect();
        let b: Vec<_> = random_linear_extension(&tasks, &mut StdRng::seed_from_u64(42))
            .iter()
            .map(|t| t.id.unwrap())
            .collect();
        assert_eq!(a, b);
    }
}
