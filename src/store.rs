use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use crate::database::{Database, DatabaseError, TASKS_SLOT};
use crate::models::{coerce_hour, coerce_minute, Task, TaskPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Failed to serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// In-memory task collection with the `tasks` slot as its only persistence boundary
pub struct TaskStore {
    database: Database,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Wrap a database and load the persisted collection once
    pub fn open(database: Database) -> Self {
        let mut store = Self {
            database,
            tasks: Vec::new(),
        };
        store.tasks = store.load();
        store
    }

    /// Read the persisted collection.
    /// A missing, unreadable or unparseable slot loads as an empty collection;
    /// individual records that fail to parse are dropped.
    pub fn load(&self) -> Vec<Task> {
        let payload = match self.database.read_slot(TASKS_SLOT) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("event=load_tasks status=recovered reason=read_failed error={}", e);
                return Vec::new();
            }
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&payload) {
            Ok(records) => records,
            Err(e) => {
                warn!("event=load_tasks status=recovered reason=parse_failed error={}", e);
                return Vec::new();
            }
        };

        // Skip malformed records, keep the first occurrence of every id, re-pad time fields
        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let mut task: Task = match serde_json::from_value(record) {
                Ok(task) => task,
                Err(e) => {
                    warn!("event=load_tasks status=repaired reason=bad_record index={} error={}", index, e);
                    continue;
                }
            };
            if !seen.insert(task.id.clone()) {
                warn!("event=load_tasks status=repaired reason=duplicate_id id={}", task.id);
                continue;
            }
            task.hour = coerce_hour(&task.hour);
            task.minute = coerce_minute(&task.minute);
            tasks.push(task);
        }

        debug!("event=load_tasks status=ok count={}", tasks.len());
        tasks
    }

    /// Serialize `tasks` and replace the persisted slot
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        write_tasks(&mut self.database, tasks)
    }

    /// Persist the store's own collection
    pub fn persist(&mut self) -> Result<(), StoreError> {
        write_tasks(&mut self.database, &self.tasks)
    }

    /// Replace the in-memory collection, e.g. to roll back after a failed persist
    pub fn restore(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a task; a task whose id is already present is dropped
    pub fn insert(&mut self, task: Task) {
        if self.contains(&task.id) {
            warn!("event=insert_task status=skipped reason=duplicate_id id={}", task.id);
            return;
        }
        self.tasks.push(task);
    }

    /// Overwrite the mutable fields of `id`. Returns false if no such task exists.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Set the completion flag of `id`. Returns false if no such task exists.
    pub fn set_completed(&mut self, id: &str, completed: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = completed;
                true
            }
            None => false,
        }
    }

    /// Remove `id` permanently; unknown ids are ignored
    pub fn remove(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }
}

fn write_tasks(database: &mut Database, tasks: &[Task]) -> Result<(), StoreError> {
    let payload = serde_json::to_string(tasks)?;
    database.write_slot(TASKS_SLOT, &payload)?;
    debug!("event=save_tasks status=ok count={}", tasks.len());
    Ok(())
}
