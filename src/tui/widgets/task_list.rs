use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Scrollbar, ScrollbarState, ScrollbarOrientation, Wrap};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use crate::projection::TaskView;
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

const LINES_PER_TASK: usize = 2;

pub fn render_task_list(f: &mut Frame, area: Rect, tasks: &[TaskView], total_count: usize, list_state: &mut ListState, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let title = format!("Tasks ({} of {})", tasks.len(), total_count);

    if tasks.is_empty() {
        let message = if total_count == 0 {
            format!("No tasks yet. Press {} to add one.", config.key_bindings.new)
        } else {
            "No tasks in this category.".to_string()
        };
        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(fg_color))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    // 2 for borders, 2 for the color bar, 1 for the scrollbar
    let max_width = area.width.saturating_sub(5) as usize;
    let items: Vec<ListItem> = tasks.iter().map(|task| task_item(task, max_width)).collect();

    // Split area to reserve space for scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);

    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let total_items = items.len();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize / LINES_PER_TASK;
    if total_items > visible_items && visible_items > 0 && scrollbar_area.width > 0 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1, // Start after top border
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        let selected_index = list_state.selected().unwrap_or(0);
        let scroll_position = selected_index.saturating_sub(visible_items - 1);

        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(scroll_position);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

/// Two lines per task: status and name, then due date and labels.
/// The leading bar carries the category color.
fn task_item(task: &TaskView, max_width: usize) -> ListItem<'static> {
    let bar = Style::default().fg(parse_color(task.color));
    let status_indicator = if task.completed { "✓" } else { "○" };
    let name_style = if task.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let first_line = Line::from(vec![
        Span::styled("▌ ", bar),
        Span::styled(truncate(&format!("{} {}", status_indicator, task.name), max_width), name_style),
    ]);
    let second_line = Line::from(vec![
        Span::styled("▌ ", bar),
        Span::raw(truncate(
            &format!("{} {} · {} · {}", task.date, task.time, task.category, task.priority),
            max_width,
        )),
    ]);

    ListItem::new(vec![first_line, second_line])
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_lines() {
        assert_eq!(truncate("Buy groceries", 8), "Buy g...");
        assert_eq!(truncate("Short", 8), "Short");
    }
}
