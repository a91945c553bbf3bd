use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use crate::tui::app::{App, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{has_primary_modifier, parse_key_binding, ParsedKeyBinding};

/// Guard that ensures terminal state is restored even on panic
/// If the terminal is left in raw mode or alternate screen, the user's
/// shell is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    /// After calling this, the guard will do nothing on drop
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error
    // lands in the normal terminal
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    info!("event=tui_start tasks={}", app.views.len());

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect, app.config.sidebar_width_percent);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only process Press events to avoid duplicate processing on Windows
        if event::poll(std::time::Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                        break; // Quit requested
                    }
                }
                Event::Resize(_width, _height) => {
                    // terminal.size() is refreshed on the next draw
                }
                _ => {}
            }
        }
    }

    guard.restore()?;
    info!("event=tui_exit");

    Ok(())
}

/// Returns Ok(true) when the user asked to quit
pub(crate) fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // The delete confirmation blocks everything else until answered
    if app.is_delete_pending() {
        return handle_delete_confirmation_modal(app, key_event);
    }

    match app.ui.mode {
        Mode::Form => handle_form_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::View => handle_global_key_bindings(app, key_event),
    }
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            // Two options, so any move flips the selection
            app.modals.delete_modal_selection = 1 - app.modals.delete_modal_selection.min(1);
        }
        KeyCode::Enter => {
            let delete = app.modals.delete_modal_selection == 0;
            app.resolve_pending_deletion(delete);
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_pending_deletion(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_pending_deletion(false),
        _ => {}
    }
    Ok(false)
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let save_binding = binding(&app.config.key_bindings.save)?;
    if matches_key_event(key_event, &save_binding) {
        app.save_form();
        return Ok(false);
    }

    let word_jump = has_primary_modifier(key_event.modifiers);

    match key_event.code {
        KeyCode::Esc => {
            app.exit_create_mode();
            app.set_status_message("Edit cancelled".to_string());
        }
        KeyCode::Tab => app.navigate_form_field(true),
        KeyCode::BackTab => app.navigate_form_field(false),
        KeyCode::Up | KeyCode::Left if app.cycle_form_choice(false) => {}
        KeyCode::Down | KeyCode::Right if app.cycle_form_choice(true) => {}
        KeyCode::Enter => {
            if app.is_description_field_active() {
                if let Some(editor) = app.get_current_form_editor() {
                    editor.insert_newline();
                }
            } else {
                app.navigate_form_field(true);
            }
        }
        code => {
            let Some(editor) = app.get_current_form_editor() else {
                return Ok(false);
            };
            match code {
                KeyCode::Char(c) if !word_jump => editor.insert_char(c),
                KeyCode::Backspace => editor.delete_char(),
                KeyCode::Delete => editor.delete_forward(),
                KeyCode::Left if word_jump => editor.move_cursor_word_left(),
                KeyCode::Right if word_jump => editor.move_cursor_word_right(),
                KeyCode::Left => editor.move_cursor_left(),
                KeyCode::Right => editor.move_cursor_right(),
                KeyCode::Up => editor.move_cursor_up(),
                KeyCode::Down => editor.move_cursor_down(),
                KeyCode::Home => editor.move_cursor_home(),
                KeyCode::End => editor.move_cursor_end(),
                _ => {}
            }
        }
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let help_binding = binding(&app.config.key_bindings.help)?;
    if key_event.code == KeyCode::Esc || matches_key_event(key_event, &help_binding) {
        app.exit_help_mode();
    }
    // Ignore all other keys in help mode
    Ok(false)
}

fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let bindings = app.config.key_bindings.clone();

    if matches_key_event(key_event, &binding(&bindings.quit)?) {
        return Ok(true);
    }
    if matches_key_event(key_event, &binding(&bindings.help)?) {
        app.enter_help_mode();
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.new)?) {
        app.enter_create_mode();
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.edit)?) || key_event.code == KeyCode::Enter {
        app.enter_edit_mode();
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.toggle_complete)?) {
        app.toggle_selected_task();
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.filter_next)?) {
        app.cycle_filter(true);
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.filter_prev)?) {
        app.cycle_filter(false);
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.cycle_sort)?) {
        app.cycle_sort();
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.list_up)?) || key_event.code == KeyCode::Up {
        app.move_selection_up();
        return Ok(false);
    }
    if matches_key_event(key_event, &binding(&bindings.list_down)?) || key_event.code == KeyCode::Down {
        app.move_selection_down();
        return Ok(false);
    }
    if key_event.code == KeyCode::Esc {
        app.clear_status_message();
    }

    Ok(false)
}

fn binding(key_str: &str) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(key_str).map_err(TuiError::KeyBindingError)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl on Windows/Linux, Option/Alt on macOS
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }

    // Shift is carried by the character itself ('F' vs 'f')
    binding.key_code == key_event.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::lifecycle::Lifecycle;
    use crate::models::Category;
    use crate::projection::{Filter, SortMode};
    use crate::store::TaskStore;
    use crate::Config;
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        let lifecycle = Lifecycle::new(TaskStore::open(Database::open_in_memory().unwrap()));
        App::new(Config::default(), lifecycle).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        let modifiers = if cfg!(target_os = "macos") { KeyModifiers::ALT } else { KeyModifiers::CONTROL };
        handle_key_event(app, KeyEvent::new(KeyCode::Char(c), modifiers)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// New task through the keyboard: name, then date replaced, then category
    fn create_task(app: &mut App, name: &str, category_steps: usize) {
        press(app, KeyCode::Char('n'));
        type_text(app, name);
        press(app, KeyCode::Tab); // Description
        press(app, KeyCode::Tab); // Date
        for _ in 0..10 {
            press(app, KeyCode::Backspace);
        }
        type_text(app, "2025-03-04");
        press(app, KeyCode::Tab); // Hour
        press(app, KeyCode::Tab); // Minute
        press(app, KeyCode::Tab); // Category
        for _ in 0..category_steps {
            press(app, KeyCode::Down);
        }
        ctrl(app, 's');
    }

    #[test]
    fn quit_key_requests_exit() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Char('j')));
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn typing_q_in_form_does_not_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::Form);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.form.task_form.as_ref().unwrap().name.to_string(), "q");
    }

    #[test]
    fn keyboard_flow_creates_task() {
        let mut app = app();
        create_task(&mut app, "Pay rent", 2);

        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.views.len(), 1);
        assert_eq!(app.views[0].name, "Pay rent");
        assert_eq!(app.views[0].category, "Work");
        assert_eq!(app.views[0].time, "00:00");
    }

    #[test]
    fn description_accepts_newlines() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Groceries");
        press(&mut app, KeyCode::Enter); // Moves to description
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "eggs");
        ctrl(&mut app, 's');

        assert_eq!(app.views[0].description, "milk\neggs");
    }

    #[test]
    fn escape_discards_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Abandoned");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.ui.mode, Mode::View);
        assert!(app.form.task_form.is_none());
        assert!(app.views.is_empty());
    }

    #[test]
    fn completing_requires_confirmation() {
        let mut app = app();
        create_task(&mut app, "Stretch", 4);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.is_delete_pending());

        // Other bindings are swallowed by the modal
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::View);
        assert!(!app.is_delete_pending());
        assert!(app.views[0].completed);

        // Unchecking never asks
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.views[0].completed);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.modals.delete_modal_selection, 1);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert!(app.views.is_empty());
    }

    #[test]
    fn edit_via_keyboard_keeps_identity() {
        let mut app = app();
        create_task(&mut app, "Read", 3);
        let id = app.views[0].id.clone();

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.ui.mode, Mode::Form);
        type_text(&mut app, " book");
        ctrl(&mut app, 's');

        assert_eq!(app.views.len(), 1);
        assert_eq!(app.views[0].id, id);
        assert_eq!(app.views[0].name, "Read book");
        assert_eq!(app.views[0].category, "Academics");
    }

    #[test]
    fn filter_and_sort_keys() {
        let mut app = app();
        create_task(&mut app, "Home", 1);
        create_task(&mut app, "Job", 2);

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.lifecycle.filter(), Filter::Category(Category::Work));
        assert_eq!(app.views.len(), 1);

        press(&mut app, KeyCode::Char('F'));
        assert_eq!(app.lifecycle.filter(), Filter::Category(Category::Personal));

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.lifecycle.sort(), SortMode::Time);
    }

    #[test]
    fn list_navigation_stays_in_bounds() {
        let mut app = app();
        create_task(&mut app, "One", 0);
        create_task(&mut app, "Two", 0);

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.ui.selected_index, 0);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.ui.selected_index, 1);
    }

    #[test]
    fn help_toggles_with_binding_and_escape() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.ui.mode, Mode::Help);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.ui.mode, Mode::View);
    }
}
