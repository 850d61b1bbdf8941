//! Chart panels: the plot state for one chart, and its rendering.
//!
//! A [`ChartPanel`] is computed once from a [`PanelData`] and then rendered
//! any number of times, into the interactive terminal or a headless buffer.
//! Nothing is shared between panels.
//!
//! ## Series to datasets
//!
//! ```text
//! values   5  6  None  7  -1  8  9
//!          └──┘        │       └──┘
//! segments [5,6]      [7]     [8,9]      gaps and sentinels split the line
//! ```
//!
//! Only the first segment of a series carries its legend name. Series with
//! fewer than two valid points are drawn as scatter markers instead.

use chrono::DateTime;
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::config::Settings;
use crate::data::{
    legend_label, AxisScale, DrawStyle, MetricKind, Page, PageKind, PanelData, SeriesStats,
    SeriesStatus,
};

const STATE_LABELS: [&str; 7] = ["", "DOWN", "", "INIT", "", "UP", ""];
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Options shared by every chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub annotate_legend_with_counts: bool,
    pub show_overlay_annotations: bool,
    pub line_width: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions::from(&Settings::default())
    }
}

impl From<&Settings> for ChartOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            annotate_legend_with_counts: settings.annotate_legend_with_counts,
            show_overlay_annotations: settings.show_overlay_annotations,
            line_width: settings.line_width,
        }
    }
}

/// Terminal marker standing in for a stroke weight.
pub fn marker_for_line_width(line_width: f64) -> Marker {
    if line_width < 1.0 {
        Marker::Dot
    } else if line_width <= 3.0 {
        Marker::Braille
    } else {
        Marker::HalfBlock
    }
}

/// One series as it will be plotted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub key: String,
    /// Legend text, including point counts when annotation is on.
    pub legend: String,
    /// Contiguous runs of valid points as `(epoch seconds, value)`.
    pub segments: Vec<Vec<(f64, f64)>>,
    /// Draw markers instead of connecting lines.
    pub scatter: bool,
    pub stats: SeriesStats,
}

impl PlotSeries {
    pub fn status(&self) -> SeriesStatus {
        self.stats.status()
    }
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub title: String,
    pub y_label: String,
    pub x_bounds: [f64; 2],
    pub x_labels: Vec<String>,
    /// `None` when no series has a valid value.
    pub y_bounds: Option<[f64; 2]>,
    pub y_labels: Vec<String>,
    pub series: Vec<PlotSeries>,
    pub annotation: Option<String>,
    pub marker: Marker,
}

impl ChartPanel {
    pub fn build(panel: &PanelData<'_>, timestamps: &[i64], options: &ChartOptions) -> Self {
        let metric = panel.metric;
        let policy = metric.sentinel_policy();
        let steps = metric.draw_style() == DrawStyle::Steps;

        let series = panel
            .series
            .iter()
            .map(|named| {
                let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
                let mut current: Vec<(f64, f64)> = Vec::new();
                for (&time, value) in timestamps.iter().zip(named.values.iter()) {
                    match value {
                        Some(v) if !v.is_nan() && !policy.is_sentinel(*v) => {
                            current.push((time as f64, *v));
                        }
                        _ if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                        _ => {}
                    }
                }
                if !current.is_empty() {
                    segments.push(current);
                }

                let scatter = named.stats.needs_markers();
                if scatter {
                    let points = segments.concat();
                    segments = if points.is_empty() { Vec::new() } else { vec![points] };
                } else if steps {
                    segments = segments.into_iter().map(step_points).collect();
                }

                PlotSeries {
                    key: named.key.clone(),
                    legend: legend_label(
                        &named.label,
                        &named.stats,
                        options.annotate_legend_with_counts,
                    ),
                    segments,
                    scatter,
                    stats: named.stats.clone(),
                }
            })
            .collect();

        let values: Vec<f64> = panel.valid_values().collect();
        let y_bounds = y_bounds(&values, metric.axis());
        let y_labels = match (y_bounds, metric.axis()) {
            (_, AxisScale::States) => STATE_LABELS.iter().map(|s| s.to_string()).collect(),
            (Some([low, high]), _) => [low, (low + high) / 2.0, high]
                .iter()
                .map(|&v| format_axis_value(v, metric.integer_valued()))
                .collect(),
            (None, _) => Vec::new(),
        };

        let (x_bounds, x_labels) = time_axis(timestamps);

        Self {
            title: panel.title.clone(),
            y_label: metric.y_label().to_string(),
            x_bounds,
            x_labels,
            y_bounds,
            y_labels,
            series,
            annotation: options
                .show_overlay_annotations
                .then(|| annotation(panel)),
            marker: marker_for_line_width(options.line_width),
        }
    }

    /// Whether there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.y_bounds.is_none()
    }
}

/// `series:N const:C` for broker charts, with `hidden:H` for partition charts.
fn annotation(panel: &PanelData<'_>) -> String {
    match panel.metric {
        MetricKind::Broker(_) => format!(
            "series:{} const:{}",
            panel.series.len(),
            panel.constant_count()
        ),
        MetricKind::Partition(_) => format!(
            "series:{} hidden:{} const:{}",
            panel.series.len(),
            panel.hidden,
            panel.constant_count()
        ),
    }
}

/// Hold each value until the next sample.
fn step_points(points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let mut stepped = Vec::with_capacity(points.len() * 2);
    for (i, &(x, y)) in points.iter().enumerate() {
        if i > 0 {
            stepped.push((x, points[i - 1].1));
        }
        stepped.push((x, y));
    }
    stepped
}

/// Vertical range for a set of valid values.
///
/// Centered axes fit the data with a 10% margin; a flat series gets a small
/// margin relative to its magnitude. Zero-based axes keep 0 in view unless the
/// data goes negative.
pub fn y_bounds(values: &[f64], axis: AxisScale) -> Option<[f64; 2]> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;

    let bounds = match axis {
        AxisScale::Centered => {
            let margin = if max > min {
                (max - min) * 0.1
            } else if min.abs() > 10.0 {
                min.abs() * 0.001
            } else {
                (min.abs() * 0.1).max(1.0)
            };
            [min - margin, max + margin]
        }
        AxisScale::FromZero => {
            let bottom = min.min(0.0);
            let top = if max > min {
                max + (max - min) * 0.05
            } else if min == 0.0 {
                0.5
            } else if min < 10.0 {
                min + (min.abs() * 0.5).max(2.0)
            } else {
                min + (min.abs() * 0.1).max(1.0)
            };
            [bottom, top]
        }
        AxisScale::States => [-1.5, 1.5],
    };

    if bounds[1] > bounds[0] {
        Some(bounds)
    } else {
        Some([bounds[0], bounds[0] + 1.0])
    }
}

fn format_axis_value(value: f64, integer: bool) -> String {
    if integer || value.abs() >= 1000.0 {
        format!("{value:.0}")
    } else if value != 0.0 && value.abs() < 0.01 {
        format!("{value:.1e}")
    } else {
        format!("{value:.2}")
    }
}

/// X range and first/middle/last labels for a timestamp list.
fn time_axis(timestamps: &[i64]) -> ([f64; 2], Vec<String>) {
    let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) else {
        return ([0.0, 1.0], Vec::new());
    };
    let (low, high) = (first as f64, last as f64);
    let high = if high > low { high } else { low + 1.0 };

    let pattern = if high - low >= SECONDS_PER_DAY {
        "%m-%d %H:%M"
    } else {
        "%H:%M:%S"
    };
    let label = |t: f64| {
        DateTime::from_timestamp(t as i64, 0)
            .map(|d| d.format(pattern).to_string())
            .unwrap_or_default()
    };

    ([low, high], vec![label(low), label((low + high) / 2.0), label(high)])
}

/// Draw a chart into `area`. A focused chart gets a highlighted border.
pub fn render(frame: &mut Frame, chart: &ChartPanel, theme: &Theme, area: Rect, focused: bool) {
    let border = if focused { theme.highlight } else { theme.border };
    let mut block = Block::default()
        .title(format!(" {} ", chart.title))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(border));
    if let Some(annotation) = &chart.annotation {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {annotation} "),
            theme.annotation,
        )));
    }

    let Some(y_bounds) = chart.y_bounds else {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let message = Paragraph::new("No Data Available")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        frame.render_widget(message, middle.intersection(inner));
        return;
    };

    let mut datasets = Vec::new();
    for (index, series) in chart.series.iter().enumerate() {
        let graph_type = if series.scatter {
            GraphType::Scatter
        } else {
            GraphType::Line
        };
        let style = Style::default().fg(theme.series_color(index));

        if series.segments.is_empty() {
            // Legend entry only
            datasets.push(Dataset::default().name(series.legend.clone()).style(style));
            continue;
        }
        for (n, segment) in series.segments.iter().enumerate() {
            let mut dataset = Dataset::default()
                .marker(chart.marker)
                .graph_type(graph_type)
                .style(style)
                .data(segment);
            if n == 0 {
                dataset = dataset.name(series.legend.clone());
            }
            datasets.push(dataset);
        }
    }

    let x_axis = Axis::default()
        .style(Style::default().fg(theme.border))
        .bounds(chart.x_bounds)
        .labels(chart.x_labels.iter().map(String::as_str));
    let y_axis = Axis::default()
        .title(chart.y_label.as_str())
        .style(Style::default().fg(theme.border))
        .bounds(y_bounds)
        .labels(chart.y_labels.iter().map(String::as_str));

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(2, 3), Constraint::Ratio(2, 3)));

    frame.render_widget(widget, area);
}

/// The charts of one page, owned so they outlive the bundle they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPage {
    pub kind: PageKind,
    pub charts: Vec<ChartPanel>,
}

impl ChartPage {
    pub fn build(page: &Page<'_>, timestamps: &[i64], options: &ChartOptions) -> Self {
        Self {
            kind: page.kind.clone(),
            charts: page
                .panels
                .iter()
                .map(|panel| ChartPanel::build(panel, timestamps, options))
                .collect(),
        }
    }

    /// Tab title.
    pub fn label(&self) -> String {
        match &self.kind {
            PageKind::Brokers => "Brokers".to_string(),
            PageKind::Topic(name) => format!("Topic {name}"),
        }
    }
}
