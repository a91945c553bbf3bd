use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::widgets::{Block, Borders};
use ratatui::style::Style;
use crate::tui::app::{App, Mode};
use crate::tui::layout::Layout;
use crate::tui::widgets::{
    tabs::render_tabs,
    task_list::render_task_list,
    item_view::render_item_view,
    status_bar::render_status_bar,
    help::render_help,
    form::render_task_form,
    color::parse_color,
    confirm_delete::render_confirm_delete,
    filters_box::{filter_summary, render_filters_box},
};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("tdl")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.lifecycle.filter(), &app.config);

    let total_count = app.lifecycle.store().tasks().len();
    render_task_list(f, layout.sidebar_area, &app.views, total_count, &mut app.ui.list_state, &app.config);

    match (app.ui.mode, app.form.task_form.as_ref()) {
        (Mode::Form, Some(form)) => render_task_form(f, layout.main_area, form, &app.config),
        _ => render_item_view(f, layout.main_area, app.selected_view(), &app.config),
    }

    let summary = filter_summary(app.lifecycle.filter(), app.lifecycle.sort(), app.views.len(), total_count);
    render_filters_box(f, layout.filters_area, &summary, &app.config);

    if app.ui.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }

    // Drawn last so it sits above everything else
    if let Some(name) = app.pending_deletion_name() {
        render_confirm_delete(f, f.area(), &name, app.modals.delete_modal_selection, &app.config);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &app.config);
}

fn get_key_hints(app: &App) -> Vec<String> {
    let bindings = &app.config.key_bindings;

    if app.is_delete_pending() {
        return vec![
            "↑/↓: Choose".to_string(),
            "Enter: Confirm".to_string(),
            "y: Delete".to_string(),
            "n/Esc: Keep".to_string(),
        ];
    }

    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&bindings.help))],
        Mode::Form => vec![
            format!("{}: Save", key(&bindings.save)),
            "Tab/Shift+Tab: Next/previous field".to_string(),
            "↑/↓: Change choice".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => vec![
            format!("{}: Quit", key(&bindings.quit)),
            format!("{}: New", key(&bindings.new)),
            format!("{}: Edit", key(&bindings.edit)),
            format!("{}: Done", key(&bindings.toggle_complete)),
            format!("{}: Filter", key(&bindings.filter_next)),
            format!("{}: Sort", key(&bindings.cycle_sort)),
            format!("{}: Help", key(&bindings.help)),
        ],
    }
}
