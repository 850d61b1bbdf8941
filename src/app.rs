use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::data::{plan_pages, History};
use crate::error::StatsError;
use crate::export::export_debug;
use crate::source::{load_file, ClientRole};
use crate::ui::chart::{ChartOptions, ChartPage, ChartPanel};
use crate::ui::headless::{self, ChartSize};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Facts about the loaded file shown in the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub client_role: ClientRole,
    pub client_name: Option<String>,
    /// Snapshots left after deduplication.
    pub snapshots: usize,
    pub brokers: usize,
    pub topics: usize,
    pub truncated: bool,
}

pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Input
    pub stats_path: PathBuf,
    pub settings: Settings,

    // Loaded data
    pub history: Option<History>,
    pub pages: Vec<ChartPage>,
    pub summary: LoadSummary,
    pub load_error: Option<String>,

    // Navigation
    pub current_page: usize,
    pub selected_chart: usize,

    // Theme
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an App for a statistics file. Call [`App::reload_data`] to load it.
    pub fn new(stats_path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self::with_theme(stats_path, settings, Theme::auto_detect())
    }

    pub fn with_theme(stats_path: impl Into<PathBuf>, settings: Settings, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            stats_path: stats_path.into(),
            settings,
            history: None,
            pages: Vec::new(),
            summary: LoadSummary::default(),
            load_error: None,
            current_page: 0,
            selected_chart: 0,
            theme,
            status_message: None,
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Re-read the statistics file and rebuild every chart.
    ///
    /// On failure the previous charts are kept and the error is recorded in
    /// `load_error`.
    pub fn reload_data(&mut self) -> Result<(), StatsError> {
        match self.load() {
            Ok(()) => {
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, path = %self.stats_path.display(), "reload failed");
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn load(&mut self) -> Result<(), StatsError> {
        let loaded = load_file(&self.stats_path)?;
        let latest = loaded.latest().cloned().unwrap_or_default();
        let history = History::build(&loaded.snapshots)?;

        let options = ChartOptions::from(&self.settings);
        self.pages = plan_pages(&history, self.settings.include_empty_series)
            .iter()
            .map(|page| ChartPage::build(page, &history.timestamps, &options))
            .collect();
        self.summary = LoadSummary {
            client_role: history.client_role,
            client_name: latest.client_name,
            snapshots: history.len(),
            brokers: history.brokers.len(),
            topics: history.topics.len(),
            truncated: loaded.truncated,
        };
        self.history = Some(history);

        // Clamp selection indices
        self.current_page = self.current_page.min(self.pages.len().saturating_sub(1));
        self.selected_chart = self.selected_chart.min(self.chart_count().saturating_sub(1));
        debug!(pages = self.pages.len(), "charts rebuilt");
        Ok(())
    }

    pub fn page(&self) -> Option<&ChartPage> {
        self.pages.get(self.current_page)
    }

    pub fn selected(&self) -> Option<&ChartPanel> {
        self.page().and_then(|p| p.charts.get(self.selected_chart))
    }

    fn chart_count(&self) -> usize {
        self.page().map_or(0, |p| p.charts.len())
    }

    /// Get breadcrumb trail for current navigation.
    pub fn breadcrumb(&self) -> String {
        let mut parts = Vec::new();
        if let Some(page) = self.page() {
            parts.push(page.label());
        }
        if let Some(chart) = self.selected() {
            parts.push(chart.title.clone());
        }
        if self.show_detail_overlay {
            parts.push("Series".to_string());
        }
        parts.join(" > ")
    }

    /// Switch to the next page (cycles).
    pub fn next_page(&mut self) {
        if !self.pages.is_empty() {
            self.set_page((self.current_page + 1) % self.pages.len());
        }
    }

    /// Switch to the previous page (cycles).
    pub fn prev_page(&mut self) {
        if !self.pages.is_empty() {
            let len = self.pages.len();
            self.set_page((self.current_page + len - 1) % len);
        }
    }

    /// Switch to a specific page; out of range indices are ignored.
    pub fn set_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current_page = index;
            self.selected_chart = 0;
        }
    }

    /// Move selection down by one chart.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one chart.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let last = self.chart_count().saturating_sub(1);
        self.selected_chart = (self.selected_chart + n).min(last);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_chart = self.selected_chart.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        self.selected_chart = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_chart = self.chart_count().saturating_sub(1);
    }

    /// Open the series overlay for the selected chart.
    pub fn enter_detail(&mut self) {
        if self.selected().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the overlay first, then return to the broker page.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_page != 0 {
            self.set_page(0);
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the chart artifacts (and debug data) for the loaded file.
    ///
    /// Returns the output directory.
    pub fn export_artifacts(&self, with_debug: bool) -> Result<PathBuf> {
        let Some(ref history) = self.history else {
            anyhow::bail!("No data to export");
        };

        let output_dir: &Path = &self.settings.output_dir;
        let pages = plan_pages(history, self.settings.include_empty_series);
        let size = ChartSize {
            width: self.settings.chart_width,
            height: self.settings.chart_height,
        };
        headless::write_pages(
            history,
            &pages,
            output_dir,
            &ChartOptions::from(&self.settings),
            size,
        )?;
        if with_debug {
            export_debug(history, &pages, output_dir)?;
        }
        Ok(output_dir.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn stats_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for (time, lag) in [(100, 3), (160, 5), (220, 4)] {
            writeln!(
                file,
                r#"{{"name":"c1","type":"consumer","time":{time},"brokers":{{"k:9092/1":{{"state":"UP"}}}},"topics":{{"a":{{"partitions":{{"0":{{"partition":0,"consumer_lag":{lag}}}}}}},"b":{{"partitions":{{"0":{{"partition":0}}}}}}}}}}"#
            )
            .unwrap();
        }
        file
    }

    fn loaded_app(settings: Settings) -> (App, NamedTempFile) {
        let file = stats_file();
        let mut app = App::with_theme(file.path(), settings, Theme::dark());
        app.reload_data().unwrap();
        (app, file)
    }

    #[test]
    fn loads_one_page_per_topic() {
        let (app, _file) = loaded_app(Settings::default());
        assert_eq!(app.pages.len(), 3);
        assert_eq!(app.pages[1].label(), "Topic a");
        assert_eq!(app.summary.snapshots, 3);
        assert_eq!(app.summary.client_name.as_deref(), Some("c1"));
        assert_eq!(app.summary.client_role, ClientRole::Consumer);
        assert!(app.load_error.is_none());
    }

    #[test]
    fn page_navigation_cycles_and_resets_selection() {
        let (mut app, _file) = loaded_app(Settings::default());
        app.select_next_n(3);
        assert_eq!(app.selected_chart, 3);

        app.next_page();
        assert_eq!(app.current_page, 1);
        assert_eq!(app.selected_chart, 0);

        app.prev_page();
        app.prev_page();
        assert_eq!(app.current_page, 2);

        app.set_page(9);
        assert_eq!(app.current_page, 2);
    }

    #[test]
    fn selection_is_clamped() {
        let (mut app, _file) = loaded_app(Settings::default());
        app.select_prev();
        assert_eq!(app.selected_chart, 0);
        app.select_next_n(100);
        assert_eq!(app.selected_chart, 9);
        app.select_first();
        app.select_last();
        assert_eq!(app.selected().unwrap().title, "Broker State");
    }

    #[test]
    fn overlay_and_back_navigation() {
        let (mut app, _file) = loaded_app(Settings::default());
        app.set_page(1);
        app.enter_detail();
        assert!(app.show_detail_overlay);
        assert_eq!(app.breadcrumb(), "Topic a > a: Committed Offset > Series");

        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_page, 1);
        app.go_back();
        assert_eq!(app.current_page, 0);
    }

    #[test]
    fn missing_file_records_error() {
        let mut app = App::with_theme("/nonexistent/stats.json", Settings::default(), Theme::dark());
        assert!(matches!(app.reload_data(), Err(StatsError::FileNotFound(_))));
        assert!(app.load_error.as_deref().unwrap().starts_with("File not found"));
        assert!(app.pages.is_empty());
        assert!(app.export_artifacts(false).is_err());
    }

    #[test]
    fn export_writes_into_output_dir() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            output_dir: dir.path().join("out"),
            ..Settings::default()
        };
        let (app, _file) = loaded_app(settings);

        let out = app.export_artifacts(true).unwrap();
        assert!(out.join("broker_metrics.txt").exists());
        assert!(out.join("topic_a.txt").exists());
        assert!(out.join("debug").join("debug_data.txt").exists());
    }

    #[test]
    fn status_messages_expire() {
        let mut app = App::with_theme("unused", Settings::default(), Theme::dark());
        app.set_status_message("Exported".to_string());
        assert_eq!(app.get_status_message(), Some("Exported"));
        app.status_message = Some(("old".to_string(), Instant::now() - Duration::from_secs(10)));
        assert_eq!(app.get_status_message(), None);
    }
}
