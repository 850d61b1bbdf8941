//! Headless chart output.
//!
//! Each page is rendered chart by chart into an off-screen buffer and written
//! as plain text: `broker_metrics.txt`, then `topic_<name>.txt` per topic.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tracing::info;

use super::chart::{self, ChartOptions, ChartPage, ChartPanel};
use super::theme::Theme;
use crate::data::{History, Page};
use crate::error::StatsError;

/// Size of each chart in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u16,
    pub height: u16,
}

/// Render one chart to text, one line per terminal row.
pub fn render_chart_text(chart: &ChartPanel, theme: &Theme, size: ChartSize) -> io::Result<String> {
    let mut terminal = Terminal::new(TestBackend::new(size.width, size.height))?;
    terminal.draw(|frame| chart::render(frame, chart, theme, frame.area(), false))?;
    Ok(buffer_text(terminal.backend().buffer()))
}

fn buffer_text(buffer: &Buffer) -> String {
    let width = usize::from(buffer.area.width.max(1));
    let mut out = String::new();
    for row in buffer.content.chunks(width) {
        let line: String = row.iter().map(|cell| cell.symbol()).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Render every chart of a page, each followed by its full legend.
pub fn render_page_text(
    page: &Page<'_>,
    timestamps: &[i64],
    options: &ChartOptions,
    theme: &Theme,
    size: ChartSize,
) -> io::Result<String> {
    let mut out = String::new();
    for chart in &ChartPage::build(page, timestamps, options).charts {
        out.push_str(&render_chart_text(chart, theme, size)?);
        for series in &chart.series {
            let marker = if series.scatter { "•" } else { "─" };
            out.push_str(&format!("  {marker} {}\n", series.legend));
        }
        out.push('\n');
    }
    Ok(out)
}

/// Write one text artifact per page into `output_dir`.
///
/// Returns the paths written.
pub fn write_pages(
    history: &History,
    pages: &[Page<'_>],
    output_dir: &Path,
    options: &ChartOptions,
    size: ChartSize,
) -> Result<Vec<PathBuf>, StatsError> {
    fs::create_dir_all(output_dir).map_err(|e| StatsError::io(output_dir, e))?;
    let theme = Theme::dark();

    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = output_dir.join(format!("{}.txt", page.file_stem()));
        let text = render_page_text(page, &history.timestamps, options, &theme, size)
            .map_err(|e| StatsError::io(&path, e))?;
        fs::write(&path, text).map_err(|e| StatsError::io(&path, e))?;
        info!("Saved {} metrics to {}", page.title(), path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plan_pages;
    use crate::source::load;
    use tempfile::TempDir;

    const SIZE: ChartSize = ChartSize {
        width: 80,
        height: 16,
    };

    fn history() -> History {
        let text = concat!(
            r#"{"time":0,"type":"consumer","brokers":{"k:9092/1":{"state":"UP","rxbytes":0,"rtt":{"avg":1000}}},"#,
            r#""topics":{"orders.v1":{"partitions":{"0":{"partition":0,"leader":1,"consumer_lag":5}}}}}"#,
            r#"{"time":60,"type":"consumer","brokers":{"k:9092/1":{"state":"UP","rxbytes":62914560,"rtt":{"avg":3000}}},"#,
            r#""topics":{"orders.v1":{"partitions":{"0":{"partition":0,"leader":1,"consumer_lag":9}}}}}"#
        );
        History::build(&load(text).unwrap().snapshots).unwrap()
    }

    #[test]
    fn chart_text_has_title_and_annotation() {
        let h = history();
        let pages = plan_pages(&h, false);
        let chart = ChartPanel::build(&pages[0].panels[0], &h.timestamps, &ChartOptions::default());

        let text = render_chart_text(&chart, &Theme::dark(), SIZE).unwrap();
        assert_eq!(text.lines().count(), usize::from(SIZE.height));
        assert!(text.lines().next().unwrap().contains("Broker RTT"));
        assert!(text.contains("series:1 const:0"));
    }

    #[test]
    fn empty_chart_says_so() {
        let h = history();
        let pages = plan_pages(&h, false);
        // Throttle was never reported
        let chart = ChartPanel::build(&pages[0].panels[5], &h.timestamps, &ChartOptions::default());
        assert!(chart.is_empty());

        let text = render_chart_text(&chart, &Theme::dark(), SIZE).unwrap();
        assert!(text.contains("No Data Available"));
    }

    #[test]
    fn pages_are_written_as_text_files() {
        let h = history();
        let pages = plan_pages(&h, false);
        let dir = TempDir::new().unwrap();

        let written =
            write_pages(&h, &pages, dir.path(), &ChartOptions::default(), SIZE).unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("broker_metrics.txt"),
                dir.path().join("topic_orders_v1.txt")
            ]
        );
        let brokers = fs::read_to_string(&written[0]).unwrap();
        assert!(brokers.contains("Broker Data Rate (RX)"));
        assert!(brokers.contains("─ Broker #1 (2 data points)"));

        let topic = fs::read_to_string(&written[1]).unwrap();
        assert!(topic.contains("orders.v1: Consumer Lag"));
        assert!(topic.contains("Partition 0 (Leader 1) (2 data points)"));
    }
}
