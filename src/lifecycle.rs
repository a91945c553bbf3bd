//! Task lifecycle state machine.
//!
//! The controller owns the [`TaskStore`] and is driven exclusively through
//! [`Lifecycle::dispatch`]. It has no knowledge of how tasks are drawn: the
//! caller redraws from [`Lifecycle::visible`] after every dispatched event.
//!
//! States are `Idle` and `Editing(id)`. Marking a task complete additionally
//! enters a pending-deletion sub-state that only `ConfirmDeletion` or
//! `CancelDeletion` can leave.

use log::{debug, error, info};
use thiserror::Error;

use crate::models::{Category, Priority, Task, TaskId, TaskPatch};
use crate::projection::{project_views, Filter, SortMode, TaskView};
use crate::store::{StoreError, TaskStore};
use crate::utils::parse_date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Due date is required")]
    MissingDate,
    #[error("Due date must be in YYYY-MM-DD format: {0}")]
    InvalidDate(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Deletion of task {0} is awaiting confirmation")]
    AwaitingConfirmation(TaskId),
}

/// Raw form values as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub date: String,
    pub hour: String,
    pub minute: String,
    pub category: String,  // Empty for unset
    pub priority: String,  // Empty defaults to low
}

impl TaskDraft {
    /// Form values for editing an existing task
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone(),
            date: task.date.format("%Y-%m-%d").to_string(),
            hour: task.hour.clone(),
            minute: task.minute.clone(),
            category: task.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            priority: task.priority.as_str().to_string(),
        }
    }

    /// Check required fields and convert into a patch with coerced time fields
    pub fn validate(&self) -> Result<TaskPatch, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let date = self.date.trim();
        if date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = parse_date(date).map_err(|_| ValidationError::InvalidDate(date.to_string()))?;

        let category = match self.category.trim() {
            "" => None,
            raw => Some(
                raw.parse::<Category>()
                    .map_err(|_| ValidationError::UnknownCategory(raw.to_string()))?,
            ),
        };

        let priority = match self.priority.trim() {
            "" => Priority::default(),
            raw => raw
                .parse::<Priority>()
                .map_err(|_| ValidationError::UnknownPriority(raw.to_string()))?,
        };

        Ok(TaskPatch {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            date,
            hour: self.hour.clone(),
            minute: self.minute.clone(),
            category,
            priority,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Editing(TaskId),
}

/// User intents reported by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    SubmitForm(TaskDraft),
    SelectForEdit(TaskId),
    CancelEdit,
    ToggleComplete { id: TaskId, checked: bool },
    ConfirmDeletion,
    CancelDeletion,
    ChangeFilter(Filter),
    ChangeSort(SortMode),
}

/// What a dispatched event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Created(TaskId),
    Updated(TaskId),
    /// The edit target vanished before the form was submitted
    UpdateSkipped(TaskId),
    /// The form should be populated with these values
    EditStarted(TaskDraft),
    FormReset,
    CompletionChanged { id: TaskId, completed: bool },
    /// The presentation must ask for confirmation before anything else happens
    DeletionRequested(TaskId),
    Deleted(TaskId),
    DeletionCancelled(TaskId),
    ViewChanged,
    Ignored,
}

pub struct Lifecycle {
    store: TaskStore,
    edit_state: EditState,
    pending_deletion: Option<TaskId>,
    filter: Filter,
    sort: SortMode,
    date_format: String,
}

impl Lifecycle {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            edit_state: EditState::Idle,
            pending_deletion: None,
            filter: Filter::default(),
            sort: SortMode::default(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    /// Initial filter/sort selections and date display format
    pub fn with_view(mut self, filter: Filter, sort: SortMode, date_format: &str) -> Self {
        self.filter = filter;
        self.sort = sort;
        self.date_format = date_format.to_string();
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit_state
    }

    pub fn pending_deletion(&self) -> Option<&TaskId> {
        self.pending_deletion.as_ref()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Recompute the display sequence from current state
    pub fn visible(&self) -> Vec<TaskView> {
        project_views(self.store.tasks(), self.filter, self.sort, &self.date_format)
    }

    /// Run one event to completion
    pub fn dispatch(&mut self, event: LifecycleEvent) -> Result<Transition, LifecycleError> {
        debug!("event=dispatch kind={:?}", event_kind(&event));

        if let Some(pending) = &self.pending_deletion {
            if !matches!(event, LifecycleEvent::ConfirmDeletion | LifecycleEvent::CancelDeletion) {
                return Err(LifecycleError::AwaitingConfirmation(pending.clone()));
            }
        }

        match event {
            LifecycleEvent::SubmitForm(draft) => self.submit(draft),
            LifecycleEvent::SelectForEdit(id) => Ok(self.select_for_edit(id)),
            LifecycleEvent::CancelEdit => {
                self.edit_state = EditState::Idle;
                Ok(Transition::FormReset)
            }
            LifecycleEvent::ToggleComplete { id, checked } => self.toggle_complete(id, checked),
            LifecycleEvent::ConfirmDeletion => self.confirm_deletion(),
            LifecycleEvent::CancelDeletion => self.cancel_deletion(),
            LifecycleEvent::ChangeFilter(filter) => {
                self.filter = filter;
                Ok(Transition::ViewChanged)
            }
            LifecycleEvent::ChangeSort(sort) => {
                self.sort = sort;
                Ok(Transition::ViewChanged)
            }
        }
    }

    fn submit(&mut self, draft: TaskDraft) -> Result<Transition, LifecycleError> {
        // Validation failures leave both the store and the edit target untouched
        let patch = draft.validate()?;

        let snapshot = self.store.tasks().to_vec();
        match std::mem::replace(&mut self.edit_state, EditState::Idle) {
            EditState::Idle => {
                let task = Task::new(patch);
                let id = task.id.clone();
                self.store.insert(task);
                self.persist_or_rollback(snapshot)?;
                info!("event=task_created id={}", id);
                Ok(Transition::Created(id))
            }
            EditState::Editing(id) => {
                if self.store.update(&id, patch) {
                    if let Err(e) = self.persist_or_rollback(snapshot) {
                        self.edit_state = EditState::Editing(id);
                        return Err(e);
                    }
                    info!("event=task_updated id={}", id);
                    Ok(Transition::Updated(id))
                } else {
                    debug!("event=task_update status=skipped reason=not_found id={}", id);
                    Ok(Transition::UpdateSkipped(id))
                }
            }
        }
    }

    fn select_for_edit(&mut self, id: TaskId) -> Transition {
        match self.store.get(&id) {
            Some(task) => {
                let draft = TaskDraft::from_task(task);
                self.edit_state = EditState::Editing(id);
                Transition::EditStarted(draft)
            }
            None => Transition::Ignored,
        }
    }

    fn toggle_complete(&mut self, id: TaskId, checked: bool) -> Result<Transition, LifecycleError> {
        let snapshot = self.store.tasks().to_vec();
        if !self.store.set_completed(&id, checked) {
            return Ok(Transition::Ignored);
        }
        self.persist_or_rollback(snapshot)?;

        if checked {
            self.pending_deletion = Some(id.clone());
            Ok(Transition::DeletionRequested(id))
        } else {
            Ok(Transition::CompletionChanged { id, completed: false })
        }
    }

    fn confirm_deletion(&mut self) -> Result<Transition, LifecycleError> {
        let Some(id) = self.pending_deletion.take() else {
            return Ok(Transition::Ignored);
        };
        let snapshot = self.store.tasks().to_vec();
        self.store.remove(&id);
        if let Err(e) = self.persist_or_rollback(snapshot) {
            self.pending_deletion = Some(id);
            return Err(e);
        }
        info!("event=task_deleted id={}", id);
        Ok(Transition::Deleted(id))
    }

    fn cancel_deletion(&mut self) -> Result<Transition, LifecycleError> {
        let Some(id) = self.pending_deletion.take() else {
            return Ok(Transition::Ignored);
        };
        // Cancelling always leaves the task marked completed
        let snapshot = self.store.tasks().to_vec();
        if self.store.set_completed(&id, true) {
            if let Err(e) = self.persist_or_rollback(snapshot) {
                self.pending_deletion = Some(id);
                return Err(e);
            }
        }
        Ok(Transition::DeletionCancelled(id))
    }

    /// Persist the store; on failure the in-memory collection reverts to `snapshot`
    fn persist_or_rollback(&mut self, snapshot: Vec<Task>) -> Result<(), LifecycleError> {
        if let Err(e) = self.store.persist() {
            error!("event=persist status=rolled_back error={}", e);
            self.store.restore(snapshot);
            return Err(e.into());
        }
        Ok(())
    }
}

fn event_kind(event: &LifecycleEvent) -> &'static str {
    match event {
        LifecycleEvent::SubmitForm(_) => "submit_form",
        LifecycleEvent::SelectForEdit(_) => "select_for_edit",
        LifecycleEvent::CancelEdit => "cancel_edit",
        LifecycleEvent::ToggleComplete { .. } => "toggle_complete",
        LifecycleEvent::ConfirmDeletion => "confirm_deletion",
        LifecycleEvent::CancelDeletion => "cancel_deletion",
        LifecycleEvent::ChangeFilter(_) => "change_filter",
        LifecycleEvent::ChangeSort(_) => "change_sort",
    }
}
