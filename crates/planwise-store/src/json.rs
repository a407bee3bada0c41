//! File-backed task repository in the canonical JSON form.
//!
//! The on-disk format is a flat JSON array of task objects with ISO-8601
//! timestamps and `YYYY-MM-DD` allocation keys; it doubles as the
//! import/export format, so a file written here can be read by any other
//! planwise tool.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use planwise_core::{Clock, StoreError, SystemClock, Task, TaskId, TaskRepository};

/// Task store persisted to a single JSON file.
///
/// The whole file is loaded at open and rewritten on every `save_all`;
/// the write replaces the file only after serialization succeeds, so a
/// serialization failure cannot truncate existing data.
pub struct JsonTaskRepository {
    path: PathBuf,
    tasks: BTreeMap<TaskId, Task>,
    next_id: TaskId,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JsonTaskRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonTaskRepository")
            .field("path", &self.path)
            .field("tasks", &self.tasks)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl JsonTaskRepository {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        path: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let tasks = if path.exists() {
            Self::load(&path)?
        } else {
            BTreeMap::new()
        };
        let next_id = tasks.keys().max().map_or(1, |max| max + 1);
        debug!(path = %path.display(), tasks = tasks.len(), "opened task store");
        Ok(Self {
            path,
            tasks,
            next_id,
            clock,
        })
    }

    fn load(path: &Path) -> Result<BTreeMap<TaskId, Task>, StoreError> {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let tasks: Vec<Task> = serde_json::from_str(&contents)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;

        let mut by_id = BTreeMap::new();
        for task in tasks {
            let id = task.id.ok_or_else(|| {
                StoreError::InvalidData(format!("stored task '{}' has no id", task.name))
            })?;
            if by_id.insert(id, task).is_some() {
                return Err(StoreError::InvalidData(format!("duplicate task id {id}")));
            }
        }
        Ok(by_id)
    }

    fn flush(&self) -> Result<(), StoreError> {
        let tasks: Vec<&Task> = self.tasks.values().collect();
        let json = serde_json::to_string_pretty(&tasks)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Where this store lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
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

impl TaskRepository for JsonTaskRepository {
    fn get_all(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    fn get_by_id(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    fn save_all(&mut self, tasks: &[Task]) -> Result<Vec<Task>, StoreError> {
        let saved: Vec<Task> = tasks.iter().map(|task| self.upsert(task)).collect();
        self.flush()?;
        debug!(path = %self.path.display(), written = saved.len(), "persisted tasks");
        Ok(saved)
    }

    fn count_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn count_tasks_with_tags(&self) -> usize {
        self.tasks.values().filter(|task| !task.tags.is_empty()).count()
    }
}
