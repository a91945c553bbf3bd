use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect,  // Area inside the outer border
    pub tabs_area: Rect,
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub filters_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: 48 columns fits the task list (30) next to a narrow detail pane
    /// Height: 12 lines (1 tabs + 6 content + 3 filters + 1 status + 1 buffer)
    pub const MIN_WIDTH: u16 = 48;
    pub const MIN_HEIGHT: u16 = 12;

    const SIDEBAR_MIN_WIDTH: u16 = 30;
    const SIDEBAR_MAX_PERCENT: u16 = 60;
    const MAIN_MIN_WIDTH: u16 = 16;

    pub fn calculate(size: Rect, sidebar_width_percent: u16) -> Self {
        let min_width_with_border = Self::MIN_WIDTH + 2;
        let min_height_with_border = Self::MIN_HEIGHT + 2;
        let width = size.width.max(min_width_with_border);
        let height = size.height.max(min_height_with_border);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Task list keeps a usable width; the detail pane keeps at least MAIN_MIN_WIDTH
        let requested_width = (inner_area.width * sidebar_width_percent) / 100;
        let max_width = (inner_area.width * Self::SIDEBAR_MAX_PERCENT) / 100;
        let sidebar_width = requested_width
            .max(Self::SIDEBAR_MIN_WIDTH)
            .min(max_width)
            .min(inner_area.width.saturating_sub(Self::MAIN_MIN_WIDTH));

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Filter tabs
                Constraint::Min(1),    // Task list + detail pane
                Constraint::Length(3), // Filter/sort summary
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(vertical[1]);

        Self {
            inner_area,
            tabs_area: vertical[0],
            sidebar_area: horizontal[0],
            main_area: horizontal[1],
            filters_area: vertical[2],
            status_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_areas_inside_border() {
        let layout = Layout::calculate(Rect::new(0, 0, 100, 30), 35);
        assert_eq!(layout.inner_area, Rect::new(1, 1, 98, 28));
        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.filters_area.height, 3);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.sidebar_area.width, 34);
        assert_eq!(layout.sidebar_area.width + layout.main_area.width, 98);
    }

    #[test]
    fn sidebar_width_is_clamped() {
        let narrow = Layout::calculate(Rect::new(0, 0, 100, 30), 5);
        assert_eq!(narrow.sidebar_area.width, 30);

        let wide = Layout::calculate(Rect::new(0, 0, 100, 30), 95);
        assert_eq!(wide.sidebar_area.width, 58);
    }

    #[test]
    fn undersized_terminal_is_treated_as_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5), 35);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
