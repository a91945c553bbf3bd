use crate::Config;
use crate::lifecycle::{Lifecycle, LifecycleError, LifecycleEvent, TaskDraft, Transition};
use crate::models::{coerce_hour, coerce_minute, Category, Priority};
use crate::projection::TaskView;
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::utils::{get_current_date_string, parse_key_binding};
use log::{debug, error};
use ratatui::widgets::ListState;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Name,
    Description,
    Date,
    Hour,
    Minute,
    Category,
    Priority,
}

impl TaskField {
    const ORDER: [TaskField; 7] = [
        TaskField::Name,
        TaskField::Description,
        TaskField::Date,
        TaskField::Hour,
        TaskField::Minute,
        TaskField::Category,
        TaskField::Priority,
    ];

    fn step(self, forward: bool) -> TaskField {
        let len = Self::ORDER.len();
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        Self::ORDER[next]
    }
}

/// Category choices offered by the form; index 0 is "unset"
pub const CATEGORY_CHOICES: [Option<Category>; 5] = [
    None,
    Some(Category::Personal),
    Some(Category::Work),
    Some(Category::Academics),
    Some(Category::Health),
];

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub name: Editor,
    pub description: Editor,
    pub date: Editor,
    pub hour: Editor,
    pub minute: Editor,
    pub category_index: usize,
    pub priority_index: usize,
    pub editing: bool,  // false for new tasks
}

impl TaskForm {
    /// Blank form for a new task, due today at 00:00
    pub fn new() -> Self {
        Self {
            current_field: TaskField::Name,
            name: Editor::new(),
            description: Editor::new(),
            date: Editor::from_string(&get_current_date_string()),
            hour: Editor::from_string("00"),
            minute: Editor::from_string("00"),
            category_index: 0,
            priority_index: 0,
            editing: false,
        }
    }

    /// Form pre-filled from a task being edited
    pub fn from_draft(draft: &TaskDraft) -> Self {
        let category_index = CATEGORY_CHOICES
            .iter()
            .position(|c| c.map(|c| c.as_str()).unwrap_or("") == draft.category)
            .unwrap_or(0);
        let priority_index = Priority::ALL
            .iter()
            .position(|p| p.as_str() == draft.priority)
            .unwrap_or(0);
        Self {
            current_field: TaskField::Name,
            name: Editor::from_string(&draft.name),
            description: Editor::from_string(&draft.description),
            date: Editor::from_string(&draft.date),
            hour: Editor::from_string(&draft.hour),
            minute: Editor::from_string(&draft.minute),
            category_index,
            priority_index,
            editing: true,
        }
    }

    pub fn category(&self) -> Option<Category> {
        CATEGORY_CHOICES.get(self.category_index).copied().flatten()
    }

    pub fn priority(&self) -> Priority {
        Priority::ALL.get(self.priority_index).copied().unwrap_or_default()
    }

    /// Raw values handed to the lifecycle for validation
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.to_string(),
            description: self.description.to_string(),
            date: self.date.to_string(),
            hour: self.hour.to_string(),
            minute: self.minute.to_string(),
            category: self.category().map(|c| c.as_str().to_string()).unwrap_or_default(),
            priority: self.priority().as_str().to_string(),
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_modal_selection: usize,  // 0 = Delete, 1 = Keep
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub task_form: Option<TaskForm>,
}

pub struct App {
    pub config: Config,
    pub lifecycle: Lifecycle,

    /// Projection of the lifecycle's current state; rebuilt after every dispatch
    pub views: Vec<TaskView>,

    pub ui: UiState,
    pub modals: ModalState,
    pub status: StatusState,
    pub form: FormState,
}

impl App {
    pub fn new(config: Config, lifecycle: Lifecycle) -> Result<Self, TuiError> {
        // Fail fast on unusable key bindings instead of on first key press
        let bindings = &config.key_bindings;
        for binding in [
            &bindings.quit,
            &bindings.new,
            &bindings.edit,
            &bindings.save,
            &bindings.toggle_complete,
            &bindings.filter_next,
            &bindings.filter_prev,
            &bindings.cycle_sort,
            &bindings.list_up,
            &bindings.list_down,
            &bindings.help,
        ] {
            parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
        }

        let mut app = Self {
            config,
            lifecycle,
            views: Vec::new(),
            ui: UiState::default(),
            modals: ModalState::default(),
            status: StatusState::default(),
            form: FormState::default(),
        };
        app.refresh();
        Ok(app)
    }

    /// Recompute the projection and keep the selection in bounds
    pub fn refresh(&mut self) {
        self.views = self.lifecycle.visible();
        self.adjust_selected_index();
    }

    /// Dispatch an event; failures become status messages.
    /// Returns the transition on success.
    pub fn dispatch(&mut self, event: LifecycleEvent) -> Option<Transition> {
        match self.lifecycle.dispatch(event) {
            Ok(transition) => {
                debug!("event=tui_transition result={:?}", transition);
                self.refresh();
                Some(transition)
            }
            Err(LifecycleError::Validation(e)) => {
                self.set_status_message(format!("Validation error: {}", e));
                None
            }
            Err(e) => {
                error!("event=tui_dispatch status=error error={}", e);
                self.set_status_message(format!("Error: {}", e));
                None
            }
        }
    }

    pub fn selected_view(&self) -> Option<&TaskView> {
        self.views.get(self.ui.selected_index)
    }

    pub fn adjust_selected_index(&mut self) {
        if self.views.is_empty() {
            self.ui.selected_index = 0;
            self.ui.list_state.select(None);
            return;
        }
        if self.ui.selected_index >= self.views.len() {
            self.ui.selected_index = self.views.len() - 1;
        }
        self.sync_list_state();
    }

    pub fn sync_list_state(&mut self) {
        self.ui.list_state.select(Some(self.ui.selected_index));
    }

    /// Move the selection onto `id` if it is visible
    pub fn select_task(&mut self, id: &str) {
        if let Some(index) = self.views.iter().position(|v| v.id == id) {
            self.ui.selected_index = index;
            self.sync_list_state();
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
            self.sync_list_state();
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.ui.selected_index + 1 < self.views.len() {
            self.ui.selected_index += 1;
            self.sync_list_state();
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn is_delete_pending(&self) -> bool {
        self.lifecycle.pending_deletion().is_some()
    }

    /// Name of the task awaiting deletion confirmation
    pub fn pending_deletion_name(&self) -> Option<String> {
        let id = self.lifecycle.pending_deletion()?;
        self.lifecycle.store().get(id).map(|t| t.name.clone())
    }

    pub fn enter_create_mode(&mut self) {
        // A leftover edit target would turn the submit into an update
        if self.dispatch(LifecycleEvent::CancelEdit).is_none() {
            return;
        }
        self.form.task_form = Some(TaskForm::new());
        self.ui.mode = Mode::Form;
    }

    pub fn enter_edit_mode(&mut self) {
        let Some(id) = self.selected_view().map(|v| v.id.clone()) else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        if let Some(Transition::EditStarted(draft)) = self.dispatch(LifecycleEvent::SelectForEdit(id)) {
            self.form.task_form = Some(TaskForm::from_draft(&draft));
            self.ui.mode = Mode::Form;
        }
    }

    pub fn exit_create_mode(&mut self) {
        self.dispatch(LifecycleEvent::CancelEdit);
        self.form.task_form = None;
        self.ui.mode = Mode::View;
    }

    /// Submit the form. Stays in the form when validation fails.
    pub fn save_form(&mut self) {
        let Some(draft) = self.form.task_form.as_ref().map(|f| f.to_draft()) else {
            return;
        };
        let Some(transition) = self.dispatch(LifecycleEvent::SubmitForm(draft)) else {
            return;
        };

        match transition {
            Transition::Created(id) => {
                self.select_task(&id);
                self.set_status_message("Task created".to_string());
            }
            Transition::Updated(id) => {
                self.select_task(&id);
                self.set_status_message("Task updated".to_string());
            }
            Transition::UpdateSkipped(_) => {
                self.set_status_message("Task no longer exists".to_string());
            }
            _ => {}
        }
        self.form.task_form = None;
        self.ui.mode = Mode::View;
    }

    /// Flip completion of the selected task. Completing asks for deletion.
    pub fn toggle_selected_task(&mut self) {
        let Some((id, completed)) = self.selected_view().map(|v| (v.id.clone(), v.completed)) else {
            return;
        };
        match self.dispatch(LifecycleEvent::ToggleComplete { id: id.clone(), checked: !completed }) {
            Some(Transition::DeletionRequested(_)) => {
                self.modals.delete_modal_selection = 0;
            }
            Some(Transition::CompletionChanged { .. }) => {
                self.select_task(&id);
                self.set_status_message("Task marked incomplete".to_string());
            }
            _ => {}
        }
    }

    /// Apply the delete modal choice: 0 deletes, anything else keeps
    pub fn resolve_pending_deletion(&mut self, delete: bool) {
        let event = if delete {
            LifecycleEvent::ConfirmDeletion
        } else {
            LifecycleEvent::CancelDeletion
        };
        match self.dispatch(event) {
            Some(Transition::Deleted(_)) => self.set_status_message("Task deleted".to_string()),
            Some(Transition::DeletionCancelled(id)) => {
                self.select_task(&id);
                self.set_status_message("Task kept as completed".to_string());
            }
            _ => {}
        }
        self.modals.delete_modal_selection = 0;
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        let current = self.lifecycle.filter();
        let next = if forward { current.next() } else { current.previous() };
        if self.dispatch(LifecycleEvent::ChangeFilter(next)).is_some() {
            self.ui.selected_index = 0;
            self.adjust_selected_index();
        }
    }

    pub fn cycle_sort(&mut self) {
        let next = self.lifecycle.sort().next();
        let selected = self.selected_view().map(|v| v.id.clone());
        if self.dispatch(LifecycleEvent::ChangeSort(next)).is_some() {
            if let Some(id) = selected {
                self.select_task(&id);
            }
            self.set_status_message(format!("Sorted by {}", next.label().to_lowercase()));
        }
    }

    /// Move focus; leaving Hour or Minute pads its value to two digits
    pub fn navigate_form_field(&mut self, forward: bool) {
        if let Some(ref mut form) = self.form.task_form {
            match form.current_field {
                TaskField::Hour => form.hour = Editor::from_string(&coerce_hour(&form.hour.to_string())),
                TaskField::Minute => form.minute = Editor::from_string(&coerce_minute(&form.minute.to_string())),
                _ => {}
            }
            form.current_field = form.current_field.step(forward);
        }
    }

    pub fn get_current_form_editor(&mut self) -> Option<&mut Editor> {
        let form = self.form.task_form.as_mut()?;
        match form.current_field {
            TaskField::Name => Some(&mut form.name),
            TaskField::Description => Some(&mut form.description),
            TaskField::Date => Some(&mut form.date),
            TaskField::Hour => Some(&mut form.hour),
            TaskField::Minute => Some(&mut form.minute),
            TaskField::Category | TaskField::Priority => None,  // Choice fields
        }
    }

    pub fn is_description_field_active(&self) -> bool {
        self.form
            .task_form
            .as_ref()
            .map(|f| f.current_field == TaskField::Description)
            .unwrap_or(false)
    }

    /// Cycle the active choice field. Returns false if no choice field is active.
    pub fn cycle_form_choice(&mut self, forward: bool) -> bool {
        let Some(ref mut form) = self.form.task_form else {
            return false;
        };
        let (index, len) = match form.current_field {
            TaskField::Category => (&mut form.category_index, CATEGORY_CHOICES.len()),
            TaskField::Priority => (&mut form.priority_index, Priority::ALL.len()),
            _ => return false,
        };
        *index = if forward { (*index + 1) % len } else { (*index + len - 1) % len };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::projection::Filter;
    use crate::store::TaskStore;

    fn app() -> App {
        let lifecycle = Lifecycle::new(TaskStore::open(Database::open_in_memory().unwrap()));
        App::new(Config::default(), lifecycle).unwrap()
    }

    fn fill(editor: &mut Editor, text: &str) {
        *editor = Editor::from_string(text);
    }

    fn add_task(app: &mut App, name: &str, category_index: usize) {
        app.enter_create_mode();
        let form = app.form.task_form.as_mut().unwrap();
        fill(&mut form.name, name);
        fill(&mut form.date, "2025-07-01");
        form.category_index = category_index;
        app.save_form();
    }

    #[test]
    fn create_from_form_selects_new_task() {
        let mut app = app();
        add_task(&mut app, "First", 0);
        add_task(&mut app, "Second", 2);

        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.views.len(), 2);
        assert_eq!(app.selected_view().unwrap().name, "Second");
        assert_eq!(app.selected_view().unwrap().category, "Work");
        assert_eq!(app.status.message.as_deref(), Some("Task created"));
    }

    #[test]
    fn invalid_form_stays_open_with_message() {
        let mut app = app();
        app.enter_create_mode();
        app.save_form();

        assert_eq!(app.ui.mode, Mode::Form);
        assert!(app.form.task_form.is_some());
        assert_eq!(app.status.message.as_deref(), Some("Validation error: Name is required"));
        assert!(app.views.is_empty());
    }

    #[test]
    fn edit_round_trip_updates_task() {
        let mut app = app();
        add_task(&mut app, "Draft", 1);
        app.enter_edit_mode();

        let form = app.form.task_form.as_mut().unwrap();
        assert!(form.editing);
        assert_eq!(form.category(), Some(Category::Personal));
        fill(&mut form.name, "Final");
        form.priority_index = 2;
        app.save_form();

        assert_eq!(app.views.len(), 1);
        assert_eq!(app.views[0].name, "Final");
        assert_eq!(app.views[0].priority, "High");
        assert_eq!(app.status.message.as_deref(), Some("Task updated"));
    }

    #[test]
    fn completing_opens_delete_confirmation() {
        let mut app = app();
        add_task(&mut app, "Chore", 0);

        app.toggle_selected_task();
        assert!(app.is_delete_pending());
        assert_eq!(app.pending_deletion_name().as_deref(), Some("Chore"));

        app.resolve_pending_deletion(false);
        assert!(!app.is_delete_pending());
        assert!(app.views[0].completed);

        app.toggle_selected_task();
        assert!(!app.is_delete_pending());
        assert!(!app.views[0].completed);

        app.toggle_selected_task();
        app.resolve_pending_deletion(true);
        assert!(app.views.is_empty());
        assert_eq!(app.status.message.as_deref(), Some("Task deleted"));
    }

    #[test]
    fn filter_cycle_narrows_list() {
        let mut app = app();
        add_task(&mut app, "Home", 1);
        add_task(&mut app, "Office", 2);

        app.cycle_filter(true);
        assert_eq!(app.lifecycle.filter(), Filter::Category(Category::Personal));
        assert_eq!(app.views.len(), 1);
        assert_eq!(app.views[0].name, "Home");

        app.cycle_filter(false);
        assert_eq!(app.lifecycle.filter(), Filter::All);
        assert_eq!(app.views.len(), 2);
    }

    #[test]
    fn form_fields_and_choices_cycle() {
        let mut app = app();
        app.enter_create_mode();
        app.navigate_form_field(false);
        assert_eq!(app.form.task_form.as_ref().unwrap().current_field, TaskField::Priority);
        assert!(app.get_current_form_editor().is_none());

        assert!(app.cycle_form_choice(false));
        assert_eq!(app.form.task_form.as_ref().unwrap().priority(), Priority::High);

        app.navigate_form_field(true);
        assert_eq!(app.form.task_form.as_ref().unwrap().current_field, TaskField::Name);
        assert!(!app.cycle_form_choice(true));
    }

    #[test]
    fn leaving_time_fields_pads_them() {
        let mut app = app();
        app.enter_create_mode();
        for _ in 0..3 {
            app.navigate_form_field(true);
        }
        let form = app.form.task_form.as_mut().unwrap();
        assert_eq!(form.current_field, TaskField::Hour);
        form.hour = Editor::new();
        form.hour.insert_char('5');

        app.navigate_form_field(true);
        let form = app.form.task_form.as_mut().unwrap();
        assert_eq!(form.hour.to_string(), "05");
        assert_eq!(form.current_field, TaskField::Minute);

        form.minute = Editor::from_string("75");
        app.navigate_form_field(false);
        let form = app.form.task_form.as_ref().unwrap();
        assert_eq!(form.minute.to_string(), "00");
        assert_eq!(form.current_field, TaskField::Hour);
    }

    #[test]
    fn cancelling_edit_then_creating_adds_new_task() {
        let mut app = app();
        add_task(&mut app, "Existing", 0);
        app.enter_edit_mode();
        app.exit_create_mode();

        add_task(&mut app, "Fresh", 0);
        assert_eq!(app.views.len(), 2);
    }

    #[test]
    fn rejects_bad_key_binding_config() {
        let mut config = Config::default();
        config.key_bindings.help = "Hyper+x".to_string();
        let lifecycle = Lifecycle::new(TaskStore::open(Database::open_in_memory().unwrap()));
        assert!(matches!(App::new(config, lifecycle), Err(TuiError::KeyBindingError(_))));
    }
}
