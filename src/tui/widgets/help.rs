use ratatui::widgets::{Block, Borders, Paragraph, Clear, Wrap};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::confirm_delete::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 75);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let bindings = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {} / {}: Move selection up/down\n", key(&bindings.list_up), key(&bindings.list_down)));
    text.push_str(&format!("  {}: New task\n", key(&bindings.new)));
    text.push_str(&format!("  {} / Enter: Edit selected task\n", key(&bindings.edit)));
    text.push_str(&format!("  {}: Toggle completed (completing asks to delete)\n", key(&bindings.toggle_complete)));
    text.push('\n');

    text.push_str("View:\n");
    text.push_str(&format!("  {} / {}: Next/previous category filter\n", key(&bindings.filter_next), key(&bindings.filter_prev)));
    text.push_str(&format!("  {}: Cycle sort (newest, due time, priority)\n", key(&bindings.cycle_sort)));
    text.push_str("  Completed tasks always sort after open ones\n");
    text.push('\n');

    text.push_str("Form:\n");
    text.push_str(&format!("  {}: Save task\n", key(&bindings.save)));
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str("  ↑/↓: Change category or priority\n");
    text.push_str("  Enter: Newline in description, next field elsewhere\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("Delete confirmation:\n");
    text.push_str("  ↑/↓ + Enter, or y / n\n");
    text.push_str("  Esc: Keep the task as completed\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&bindings.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&bindings.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_reflects_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.new = "a".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  a: New task\n"));
        assert!(text.contains("Ctrl+s: Save task") || text.contains("Opt+s: Save task"));
    }
}
