//! Rendering and export settings.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! ```text
//! built-in defaults
//!    ▼
//! TOML file (--config)
//!    ▼
//! STATWATCH_* environment variables
//!    ▼
//! command-line flags (applied by the binary)
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::StatsError;

/// Prefix for environment overrides, e.g. `STATWATCH_LINE_WIDTH=1.5`.
pub const ENV_PREFIX: &str = "STATWATCH";

/// Chart generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Directory receiving chart and debug artifacts.
    pub output_dir: PathBuf,
    /// Keep series that are all gaps.
    pub include_empty_series: bool,
    /// Append valid-point counts and constants to legend labels.
    pub annotate_legend_with_counts: bool,
    /// Draw the `series:N const:C` overlay on each chart.
    pub show_overlay_annotations: bool,
    /// Stroke weight; selects the terminal marker used for lines.
    pub line_width: f64,
    /// Width in cells of each headless chart.
    pub chart_width: u16,
    /// Height in cells of each headless chart.
    pub chart_height: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("kafka_graphs"),
            include_empty_series: false,
            annotate_legend_with_counts: true,
            show_overlay_annotations: true,
            line_width: 3.0,
            chart_width: 120,
            chart_height: 24,
        }
    }
}

impl Settings {
    /// Assemble settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, StatsError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("output_dir", defaults.output_dir.to_string_lossy().into_owned())?
            .set_default("include_empty_series", defaults.include_empty_series)?
            .set_default("annotate_legend_with_counts", defaults.annotate_legend_with_counts)?
            .set_default("show_overlay_annotations", defaults.show_overlay_annotations)?
            .set_default("line_width", defaults.line_width)?
            .set_default("chart_width", defaults.chart_width as i64)?
            .set_default("chart_height", defaults.chart_height as i64)?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(StatsError::FileNotFound(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings.sanitized())
    }

    /// Clamp values that would make charts unrenderable.
    pub fn sanitized(mut self) -> Self {
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            self.line_width = Settings::default().line_width;
        }
        self.chart_width = self.chart_width.max(40);
        self.chart_height = self.chart_height.max(8);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("kafka_graphs"));
        assert!(!settings.include_empty_series);
        assert!(settings.annotate_legend_with_counts);
        assert_eq!(settings.line_width, 3.0);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "output_dir = \"out\"").unwrap();
        writeln!(file, "include_empty_series = true").unwrap();
        writeln!(file, "line_width = 1.0").unwrap();
        writeln!(file, "chart_height = 2").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert!(settings.include_empty_series);
        assert_eq!(settings.line_width, 1.0);
        assert_eq!(settings.chart_height, 8);
        assert!(settings.show_overlay_annotations);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = Settings::load(Some(Path::new("/nonexistent/statwatch.toml")));
        assert!(matches!(result, Err(StatsError::FileNotFound(_))));
    }

    #[test]
    fn bad_value_is_a_config_error() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "chart_width = \"wide\"").unwrap();

        let result = Settings::load(Some(file.path()));
        assert!(matches!(result, Err(StatsError::Config(_))));
    }
}
