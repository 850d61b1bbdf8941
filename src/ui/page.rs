//! The chart stack of the current page.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use super::chart;
use crate::app::App;

/// Rows given to each chart before the stack starts scrolling.
const MIN_CHART_HEIGHT: u16 = 12;

/// How many charts fit in `height` rows (at least one).
pub fn charts_per_screen(height: u16) -> usize {
    usize::from((height / MIN_CHART_HEIGHT).max(1))
}

/// Index of the first chart shown so that `selected` is on screen.
pub fn window_start(selected: usize, per_screen: usize) -> usize {
    let per_screen = per_screen.max(1);
    (selected / per_screen) * per_screen
}

/// Render the charts of the current page, stacked vertically.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(page) = app.page() else {
        let text = match &app.load_error {
            Some(err) => format!("Error: {err}"),
            None => "No data loaded".to_string(),
        };
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    };

    let per_screen = charts_per_screen(area.height);
    let start = window_start(app.selected_chart, per_screen);
    let visible: Vec<_> = page.charts.iter().enumerate().skip(start).take(per_screen).collect();
    if visible.is_empty() {
        return;
    }

    let constraints = vec![Constraint::Ratio(1, visible.len() as u32); visible.len()];
    let areas = Layout::vertical(constraints).split(area);
    for ((index, panel), slot) in visible.into_iter().zip(areas.iter()) {
        chart::render(frame, panel, &app.theme, *slot, index == app.selected_chart);
    }
}
