use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::projection::{Filter, SortMode};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display;

/// "Filter: Work • Sort: Priority • 3 of 7 tasks"
pub fn filter_summary(filter: Filter, sort: SortMode, visible: usize, total: usize) -> String {
    format!(
        "Filter: {} • Sort: {} • {} of {} tasks",
        filter.label(),
        sort.label(),
        visible,
        total
    )
}

pub fn render_filters_box(
    f: &mut Frame,
    area: Rect,
    summary: &str,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let title = format!(
        "{}/{}: Filter  {}: Sort",
        format_key_binding_for_display(&config.key_bindings.filter_next),
        format_key_binding_for_display(&config.key_bindings.filter_prev),
        format_key_binding_for_display(&config.key_bindings.cycle_sort),
    );
    let paragraph = Paragraph::new(summary)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn summary_names_filter_sort_and_counts() {
        let summary = filter_summary(Filter::Category(Category::Work), SortMode::Priority, 3, 7);
        assert_eq!(summary, "Filter: Work • Sort: Priority • 3 of 7 tasks");
    }
}
