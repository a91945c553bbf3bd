use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::style::{Modifier, Style};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use crate::projection::TaskView;
use crate::Config;
use crate::tui::widgets::color::parse_color;

/// Detail lines for one task; the description keeps its own line breaks
pub fn detail_lines(task: &TaskView) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let status = if task.completed { "Completed" } else { "Open" };

    let mut lines = vec![
        Line::from(Span::styled(task.name.clone(), label)),
        Line::from(""),
        Line::from(vec![Span::styled("Due: ", label), Span::raw(format!("{} {}", task.date, task.time))]),
        Line::from(vec![
            Span::styled("Category: ", label),
            Span::styled("● ", Style::default().fg(parse_color(task.color))),
            Span::raw(task.category),
        ]),
        Line::from(vec![Span::styled("Priority: ", label), Span::raw(task.priority)]),
        Line::from(vec![Span::styled("Status: ", label), Span::raw(status)]),
    ];

    if !task.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description:", label)));
        lines.extend(task.description.lines().map(|l| Line::from(l.to_string())));
    }

    lines
}

pub fn render_item_view(f: &mut Frame, area: Rect, task: Option<&TaskView>, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);

    let block = Block::default().borders(Borders::ALL).title("Details");
    let paragraph = match task {
        Some(task) => Paragraph::new(detail_lines(task)).wrap(Wrap { trim: false }),
        None => Paragraph::new("Select a task to view details"),
    };
    f.render_widget(paragraph.block(block).style(Style::default().fg(fg_color)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(description: &str) -> TaskView {
        TaskView {
            id: "a".to_string(),
            name: "Dentist".to_string(),
            description: description.to_string(),
            color: "#4CAF50",
            date: "4. 3. 2025".to_string(),
            time: "09:30".to_string(),
            category: "Health",
            priority: "High",
            completed: false,
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect()).collect()
    }

    #[test]
    fn details_include_due_and_labels() {
        let lines = text(&detail_lines(&view("")));
        assert_eq!(lines[0], "Dentist");
        assert!(lines.contains(&"Due: 4. 3. 2025 09:30".to_string()));
        assert!(lines.contains(&"Category: ● Health".to_string()));
        assert!(lines.contains(&"Status: Open".to_string()));
        assert!(!lines.contains(&"Description:".to_string()));
    }

    #[test]
    fn description_lines_are_kept() {
        let lines = text(&detail_lines(&view("bring card\narrive early")));
        assert_eq!(&lines[lines.len() - 2..], ["bring card", "arrive early"]);
    }
}
