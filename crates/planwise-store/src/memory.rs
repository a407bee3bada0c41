//! In-memory task repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use planwise_core::{Clock, StoreError, SystemClock, Task, TaskId, TaskRepository};

/// Ephemeral repository holding tasks in a `BTreeMap`, so reads come back
/// in id order. Used by tests and by embedders that manage persistence
/// themselves.
pub struct InMemoryTaskRepository {
    tasks: BTreeMap<TaskId, Task>,
    next_id: TaskId,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Use an injected clock for deterministic timestamps.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
            clock,
        }
    }

    /// Seed the store with existing tasks, assigning ids where missing.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut repo = Self::new();
        let tasks: Vec<Task> = tasks.into_iter().collect();
        repo.save_all(&tasks).expect("in-memory save cannot fail");
        repo
    }

    fn upsert(&mut self, task: &Task) -> Task {
        let now = self.clock.now();
        let mut stored = task.clone();
        let id = match stored.id {
            Some(id) => {
                self.next_id = self.next_id.max(id + 1);
                id
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                stored.id = Some(id);
                id
            }
        };
        if let Some(existing) = self.tasks.get(&id) {
            stored.created_at = existing.created_at;
        }
        if stored.created_at.is_none() {
            stored.created_at = Some(now);
        }
        stored.updated_at = Some(now);
        self.tasks.insert(id, stored.clone());
        stored
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn get_all(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    fn get_by_id(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    fn save_all(&mut self, tasks: &[Task]) -> Result<Vec<Task>, StoreError> {
        Ok(tasks.iter().map(|task| self.upsert(task)).collect())
    }

    fn count_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn count_tasks_with_tags(&self) -> usize {
        self.tasks.values().filter(|task| !task.tags.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planwise_core::FixedClock;
    use pretty_assertions::assert_eq;

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2025, 10, 20)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ))
    }

    #[test]
    fn save_assigns_sequential_ids() {
        let mut repo = InMemoryTaskRepository::with_clock(fixed_clock());
        let saved = repo
            .save_all(&[Task::new("one"), Task::new("two")])
            .unwrap();
        assert_eq!(saved[0].id, Some(1));
        assert_eq!(saved[1].id, Some(2));
        assert_eq!(repo.count_tasks(), 2);
    }

    #[test]
    fn save_stamps_timestamps() {
        let mut repo = InMemoryTaskRepository::with_clock(fixed_clock());
        let saved = repo.save_all(&[Task::new("stamped")]).unwrap();
        assert!(saved[0].created_at.is_some());
        assert_eq!(saved[0].created_at, saved[0].updated_at);
    }

    #[test]
    fn upsert_preserves_created_at() {
        let mut repo = InMemoryTaskRepository::with_clock(fixed_clock());
        let saved = repo.save_all(&[Task::new("original")]).unwrap();
        let created = saved[0].created_at;

        let mut updated = saved[0].clone();
        updated.name = "renamed".into();
        let saved_again = repo.save_all(&[updated]).unwrap();

        assert_eq!(saved_again[0].created_at, created);
        assert_eq!(repo.count_tasks(), 1);
        assert_eq!(repo.get_by_id(1).unwrap().name, "renamed");
    }

    #[test]
    fn explicit_ids_advance_the_counter() {
        let mut repo = InMemoryTaskRepository::with_clock(fixed_clock());
        repo.save_all(&[Task::new("explicit").with_id(10)]).unwrap();
        let saved = repo.save_all(&[Task::new("next")]).unwrap();
        assert_eq!(saved[0].id, Some(11));
    }

    #[test]
    fn count_tasks_with_tags() {
        let repo = InMemoryTaskRepository::with_tasks([
            Task::new("tagged").tag("home"),
            Task::new("untagged"),
        ]);
        assert_eq!(repo.count_tasks_with_tags(), 1);
    }
}
