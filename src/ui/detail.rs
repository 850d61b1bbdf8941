//! Series overlay rendering.
//!
//! Displays a modal overlay with the diagnostics of every series on the
//! selected chart.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::chart::{ChartPanel, PlotSeries};
use crate::app::App;
use crate::data::{format_constant, SeriesStatus};

/// Minimum width required for the overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Short label for a series status.
pub fn status_label(status: SeriesStatus) -> String {
    match status {
        SeriesStatus::NoData => "no data".to_string(),
        SeriesStatus::NotAssigned => "not assigned".to_string(),
        SeriesStatus::Sparse => "sparse".to_string(),
        SeriesStatus::Constant(value) => format!("constant {}", format_constant(value)),
        SeriesStatus::Varying => "ok".to_string(),
    }
}

/// Table cells for one series, in column order.
pub fn series_cells(series: &PlotSeries) -> [String; 8] {
    let stats = &series.stats;
    let value = |v: Option<f64>| v.map(format_constant).unwrap_or_else(|| "-".into());
    let index = |i: Option<usize>| i.map(|i| i.to_string()).unwrap_or_else(|| "-".into());
    [
        series.key.clone(),
        status_label(series.status()),
        stats.valid_count.to_string(),
        stats.sentinel_count.to_string(),
        value(stats.min),
        value(stats.max),
        index(stats.first_valid_index),
        index(stats.last_valid_index),
    ]
}

/// Render the series diagnostics of the selected chart as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(chart) = app.selected() else {
        return;
    };

    // Width: 95% of screen, clamped to [MIN_OVERLAY_WIDTH, 110]
    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    // Height: 80% of screen, clamped to [MIN_OVERLAY_HEIGHT, 40]
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(4), // Header with chart info
        Constraint::Min(5),    // Series table
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    render_header(frame, app, chart, chunks[0]);
    render_table(frame, app, chart, chunks[1]);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, chart: &ChartPanel, area: Rect) {
    let plotted = chart.series.iter().filter(|s| s.stats.valid_count > 0).count();
    let lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", chart.title),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw(" Series: "),
            Span::styled(
                chart.series.len().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Plotted: "),
            Span::styled(
                plotted.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Unit: "),
            Span::raw(chart.y_label.clone()),
        ]),
    ];

    let block = Block::default()
        .title(" Series Diagnostics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, chart: &ChartPanel, area: Rect) {
    let block = Block::default()
        .title(format!(" Series ({}) ", chart.series.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if chart.series.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No series on this chart",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Series"),
        Cell::from("Status"),
        Cell::from("Valid"),
        Cell::from("Not Assigned"),
        Cell::from("Min"),
        Cell::from("Max"),
        Cell::from("First"),
        Cell::from("Last"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = chart
        .series
        .iter()
        .map(|series| {
            let status_style = app.theme.status_style(series.status());
            let cells = series_cells(series);
            Row::new(
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let cell = Cell::from(text);
                        if i == 1 {
                            cell.style(status_style)
                        } else {
                            cell
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let widths = [
        Constraint::Fill(3),    // Series
        Constraint::Length(16), // Status
        Constraint::Length(6),  // Valid
        Constraint::Length(13), // Not Assigned
        Constraint::Length(10), // Min
        Constraint::Length(10), // Max
        Constraint::Length(6),  // First
        Constraint::Length(6),  // Last
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
