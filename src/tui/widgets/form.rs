use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Constraint, Layout, Direction};
use ratatui::text::{Line, Span};
use crate::models::category_label;
use crate::Config;
use crate::tui::app::{TaskForm, TaskField};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color, category_display_color};

/// One visual row of a wrapped multi-line editor
#[derive(Debug, PartialEq, Eq)]
struct WrappedRow {
    logical_line: usize,
    char_offset: usize,  // Where this row starts in its logical line
    text: String,
}

/// Hard-wrap every editor line into rows of at most `width` chars
fn wrap_rows(lines: &[String], width: usize) -> Vec<WrappedRow> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for (logical_line, line) in lines.iter().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(WrappedRow { logical_line, char_offset: 0, text: String::new() });
            continue;
        }
        for (chunk_index, chunk) in chars.chunks(width).enumerate() {
            rows.push(WrappedRow {
                logical_line,
                char_offset: chunk_index * width,
                text: chunk.iter().collect(),
            });
        }
    }
    rows
}

/// Row index and column of the cursor among wrapped rows.
/// A cursor sitting exactly on a wrap boundary belongs to the next row,
/// except at the end of the logical line.
fn cursor_row(rows: &[WrappedRow], editor: &Editor, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let mut found = (0, 0);
    for (index, row) in rows.iter().enumerate() {
        if row.logical_line != editor.cursor_line || editor.cursor_col < row.char_offset {
            continue;
        }
        let col = editor.cursor_col - row.char_offset;
        if col < width {
            return (index, col);
        }
        found = (index, col.min(width));
    }
    found
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &TaskForm, config: &Config) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };
    let highlight_style = Style::default().bg(highlight_bg).fg(highlight_fg);
    let inactive_field_style = Style::default().fg(fg_color).add_modifier(Modifier::DIM);
    let style_for = |field: TaskField| {
        if form.current_field == field { highlight_style } else { inactive_field_style }
    };

    let title = if form.editing { "Edit Task" } else { "New Task" };
    let outer = Block::default().borders(Borders::ALL).title(title).style(Style::default().fg(fg_color));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Min(3),    // Description
            Constraint::Length(3), // Date
            Constraint::Length(3), // Hour | Minute
            Constraint::Length(3), // Category | Priority
        ])
        .split(inner);
    let halves = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row)
    };
    let time_areas = halves(rows[3]);
    let choice_areas = halves(rows[4]);

    let mut cursor = None;
    let single_line_fields = [
        (TaskField::Name, &form.name, rows[0], "Name *"),
        (TaskField::Date, &form.date, rows[2], "Due date * (YYYY-MM-DD)"),
        (TaskField::Hour, &form.hour, time_areas[0], "Hour"),
        (TaskField::Minute, &form.minute, time_areas[1], "Minute"),
    ];
    for (field, editor, field_area, label) in single_line_fields {
        let width = field_area.width.saturating_sub(2) as usize;
        let (visible, cursor_offset) = editor.single_line_view(width);
        let paragraph = Paragraph::new(visible)
            .style(style_for(field))
            .block(Block::default().borders(Borders::ALL).title(label));
        f.render_widget(paragraph, field_area);
        if form.current_field == field {
            cursor = Some((field_area.x + 1 + cursor_offset as u16, field_area.y + 1));
        }
    }

    if let Some(position) = render_description(f, rows[1], form, style_for(TaskField::Description)) {
        cursor = Some(position);
    }

    let category = form.category();
    let category_line = Line::from(vec![
        Span::raw("◀ "),
        Span::styled("● ", Style::default().fg(category_display_color(category))),
        Span::raw(category_label(category)),
        Span::raw(" ▶"),
    ]);
    let category_paragraph = Paragraph::new(category_line)
        .style(style_for(TaskField::Category))
        .block(Block::default().borders(Borders::ALL).title("Category"));
    f.render_widget(category_paragraph, choice_areas[0]);

    let priority_paragraph = Paragraph::new(format!("◀ {} ▶", form.priority().label()))
        .style(style_for(TaskField::Priority))
        .block(Block::default().borders(Borders::ALL).title("Priority"));
    f.render_widget(priority_paragraph, choice_areas[1]);

    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}

/// Wrapped description editor with a scrollbar once it overflows.
/// Returns the cursor position when the field is active.
fn render_description(f: &mut Frame, area: Rect, form: &TaskForm, style: Style) -> Option<(u16, u16)> {
    let is_active = form.current_field == TaskField::Description;
    let content_height = area.height.saturating_sub(2) as usize;
    // Leave one column for the scrollbar
    let content_width = area.width.saturating_sub(3) as usize;

    let rows = wrap_rows(&form.description.lines, content_width);
    let (cursor_index, cursor_col) = cursor_row(&rows, &form.description, content_width);
    let scroll = if cursor_index < content_height {
        0
    } else {
        cursor_index + 1 - content_height
    };

    let visible: Vec<Line> = rows
        .iter()
        .skip(scroll)
        .take(content_height)
        .map(|row| Line::from(row.text.clone()))
        .collect();
    let paragraph = Paragraph::new(visible)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Description"));
    f.render_widget(paragraph, area);

    if rows.len() > content_height && content_height > 0 {
        let scrollbar_area = Rect::new(area.x + area.width.saturating_sub(2), area.y + 1, 1, content_height as u16);
        let mut scrollbar_state = ScrollbarState::new(rows.len())
            .viewport_content_length(content_height)
            .position(scroll);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }

    if is_active && content_height > 0 {
        Some((area.x + 1 + cursor_col as u16, area.y + 1 + (cursor_index - scroll) as u16))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    #[test]
    fn wraps_long_lines_into_rows() {
        let rows = wrap_rows(&lines("abcdefg\n\nxy"), 3);
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "def", "g", "", "xy"]);
        assert_eq!(rows[2], WrappedRow { logical_line: 0, char_offset: 6, text: "g".to_string() });
    }

    #[test]
    fn cursor_follows_wrapped_rows() {
        let mut editor = Editor::from_string("abcdef");
        let rows = wrap_rows(&editor.lines, 3);
        // End of line stays on the last row
        assert_eq!(cursor_row(&rows, &editor, 3), (1, 3));

        editor.cursor_col = 3;
        assert_eq!(cursor_row(&rows, &editor, 3), (1, 0));

        editor.cursor_col = 1;
        assert_eq!(cursor_row(&rows, &editor, 3), (0, 1));
    }
}
