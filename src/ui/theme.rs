//! Theme configuration for charts and the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::SeriesStatus;

/// Color and style theme.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for sparse or flat series.
    pub warning: Color,
    /// Color for series with nothing to plot.
    pub critical: Color,
    /// Color for series that plot normally.
    pub healthy: Color,
    /// Color for borders, axes and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Style for the small per-chart annotation.
    pub annotation: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Colors cycled through for chart series.
    pub palette: Vec<Color>,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            annotation: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            border_type: BorderType::Rounded,
            palette: vec![
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Green,
                Color::LightRed,
                Color::LightBlue,
                Color::White,
                Color::LightYellow,
            ],
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            annotation: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            border_type: BorderType::Rounded,
            palette: vec![
                Color::Blue,
                Color::Red,
                Color::Magenta,
                Color::Green,
                Color::DarkGray,
                Color::Cyan,
                Color::Black,
                Color::LightRed,
            ],
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color of the `index`-th series on a chart.
    pub fn series_color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return self.highlight;
        }
        self.palette[index % self.palette.len()]
    }

    /// Get style for a series status
    pub fn status_style(&self, status: SeriesStatus) -> Style {
        match status {
            SeriesStatus::Varying => Style::default().fg(self.healthy),
            SeriesStatus::Constant(_) | SeriesStatus::Sparse => Style::default().fg(self.warning),
            SeriesStatus::NotAssigned | SeriesStatus::NoData => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        let theme = Theme::dark();
        let n = theme.palette.len();
        assert_eq!(theme.series_color(0), theme.series_color(n));
        assert_ne!(theme.series_color(0), theme.series_color(1));
    }
}
