use ratatui::widgets::Tabs;
use ratatui::style::{Style, Modifier};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::projection::Filter;
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color, category_display_color};

/// One tab per filter option; the active filter is highlighted
pub fn render_tabs(f: &mut Frame, area: Rect, current: Filter, config: &Config) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let tab_bg = parse_color(&active_theme.tab_bg);

    // Contrast-aware text keeps tabs readable whatever gray the terminal renders
    let tab_fg = get_contrast_text_color(tab_bg);

    let options = Filter::options();
    let titles: Vec<Line> = options
        .iter()
        .map(|filter| {
            let mut spans = vec![Span::styled(" ", Style::default().bg(tab_bg))];
            if let Filter::Category(category) = filter {
                spans.push(Span::styled(
                    "● ",
                    Style::default().fg(category_display_color(Some(*category))).bg(tab_bg),
                ));
            }
            spans.push(Span::styled(filter.label(), Style::default().fg(tab_fg).bg(tab_bg)));
            spans.push(Span::styled(" ", Style::default().bg(tab_bg)));
            Line::from(spans)
        })
        .collect();

    let tab_index = options.iter().position(|o| *o == current).unwrap_or(0);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let tabs = Tabs::new(titles)
        .select(tab_index)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD)
        )
        .divider(" ")
        .padding("", "");

    f.render_widget(tabs, area);
}
