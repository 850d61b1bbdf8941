//! Debug artifacts for checking what was actually charted.
//!
//! ```text
//! <output>/debug/
//! ├── debug_data.txt              raw dump of every series
//! ├── brokers/<slug>.csv          one row per timestamp, one column per series
//! ├── brokers/<slug>.summary.txt  per-series statistics
//! └── topics/...                  same, for each topic chart
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::data::{iso_timestamp, History, Page, PanelData, SentinelPolicy, Series, SeriesStats};
use crate::error::StatsError;

/// Literal written for sentinel values.
pub const NOT_ASSIGNED_TOKEN: &str = "Not Assigned";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// Replace every run of characters outside `[A-Za-z0-9._-]` with `_`.
pub fn slugify(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}

/// Write the raw dump and the per-chart files for every page.
///
/// Returns the paths written.
pub fn export_debug(
    history: &History,
    pages: &[Page<'_>],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, StatsError> {
    let debug_dir = output_dir.join("debug");
    let mut written = vec![write_debug_dump(history, &debug_dir.join("debug_data.txt"))?];

    for page in pages {
        let dir = debug_dir.join(page.debug_dir());
        for panel in &page.panels {
            written.extend(write_panel_debug(panel, &history.timestamps, &dir)?);
        }
    }

    info!(files = written.len(), dir = %debug_dir.display(), "wrote debug data");
    Ok(written)
}

/// Write `<slug>.csv` and `<slug>.summary.txt` for one chart.
pub fn write_panel_debug(
    panel: &PanelData<'_>,
    timestamps: &[i64],
    dir: &Path,
) -> Result<[PathBuf; 2], StatsError> {
    fs::create_dir_all(dir).map_err(|e| StatsError::io(dir, e))?;
    let slug = slugify(&panel.title);

    let csv_path = dir.join(format!("{slug}.csv"));
    write_file(&csv_path, &panel_csv(panel, timestamps))?;

    let summary_path = dir.join(format!("{slug}.summary.txt"));
    write_file(&summary_path, &panel_summary(panel, timestamps.len()))?;

    log_visibility_hints(panel);
    Ok([csv_path, summary_path])
}

/// CSV of the exact values charted: gaps empty, sentinels spelled out.
pub fn panel_csv(panel: &PanelData<'_>, timestamps: &[i64]) -> String {
    let policy = panel.metric.sentinel_policy();
    let mut out = String::from("timestamp");
    for series in &panel.series {
        out.push(',');
        out.push_str(&slugify(&series.key));
    }
    out.push('\n');

    for (index, &time) in timestamps.iter().enumerate() {
        out.push_str(&iso_timestamp(time));
        for series in &panel.series {
            out.push(',');
            out.push_str(&csv_cell(series.values.get(index).copied().flatten(), policy));
        }
        out.push('\n');
    }
    out
}

fn csv_cell(value: Option<f64>, policy: SentinelPolicy) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_nan() => String::new(),
        Some(v) if policy.is_sentinel(v) => NOT_ASSIGNED_TOKEN.to_string(),
        Some(v) => format!("{v:?}"),
    }
}

/// Per-series statistics for one chart.
pub fn panel_summary(panel: &PanelData<'_>, points: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Plot: {}", panel.title);
    let _ = writeln!(out, "Points per series: {points}\n");

    for series in &panel.series {
        if series.stats.is_all_sentinel() {
            let _ = writeln!(
                out,
                "- {}: All {} points = {NOT_ASSIGNED_TOKEN}",
                series.key, series.stats.total_points
            );
        } else {
            let _ = writeln!(out, "- {}: {}", series.key, series.stats);
        }
    }
    out
}

fn log_visibility_hints(panel: &PanelData<'_>) {
    for series in &panel.series {
        let stats: &SeriesStats = &series.stats;
        if stats.needs_markers() {
            warn!(
                "'{}' series '{}' has only {} valid point(s); lines won't render, drawing markers",
                panel.title, series.key, stats.valid_count
            );
        } else if let Some(value) = stats.constant_value() {
            warn!(
                "'{}' series '{}' is constant at {value:?} (flat line)",
                panel.title, series.key
            );
        }
    }
}

/// Raw dump of the whole bundle.
pub fn write_debug_dump(history: &History, path: &Path) -> Result<PathBuf, StatsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StatsError::io(parent, e))?;
    }
    info!(path = %path.display(), "writing debug data");
    write_file(path, &debug_dump(history))?;
    Ok(path.to_path_buf())
}

/// Text rendering of every series in the bundle.
pub fn debug_dump(history: &History) -> String {
    let mut out = String::new();

    let times: Vec<String> = history.timestamps.iter().map(|&t| iso_timestamp(t)).collect();
    let _ = writeln!(out, "--- TIMESTAMPS ---\n{times:?}\n");
    let _ = writeln!(out, "--- CLIENT_TYPE ---\n{}\n", history.client_role.as_str());

    let _ = writeln!(out, "--- BROKERS ---");
    for (id, broker) in &history.brokers {
        let _ = writeln!(out, "  {id}:");
        let metrics: [(&str, &Series); 10] = [
            ("rtt", &broker.rtt_ms),
            ("state", &broker.state),
            ("throttle", &broker.throttle_ms),
            ("connects", &broker.connects),
            ("disconnects", &broker.disconnects),
            ("rx_rate", &broker.rx_rate),
            ("tx_rate", &broker.tx_rate),
            ("rxerrs", &broker.receive_errors),
            ("txerrs", &broker.send_errors),
            ("req_timeouts", &broker.request_timeouts),
        ];
        for (name, series) in metrics {
            let _ = writeln!(out, "    {name}: {}", format_series(series));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "--- TOPICS ---");
    for (topic, partitions) in &history.topics {
        let _ = writeln!(out, "  {topic}:");
        for (id, partition) in partitions {
            let _ = writeln!(out, "    {id}:");
            let metrics: [(&str, &Series); 5] = [
                ("lag", &partition.consumer_lag),
                ("lag_stored", &partition.consumer_lag_stored),
                ("committed", &partition.committed_offset),
                ("stored", &partition.stored_offset),
                ("leader_epoch", &partition.committed_leader_epoch),
            ];
            for (name, series) in metrics {
                let _ = writeln!(out, "      {name}: {}", format_series(series));
            }
            let leader = partition
                .leader_last
                .map_or_else(|| "none".to_string(), |l| l.to_string());
            let _ = writeln!(out, "      leader_last: {leader}");
        }
        out.push('\n');
    }

    out
}

fn format_series(series: &Series) -> String {
    let values: Vec<String> = series
        .iter()
        .map(|v| v.map_or_else(|| "nan".to_string(), |v| format!("{v:?}")))
        .collect();
    format!("[{}]", values.join(", "))
}

fn write_file(path: &Path, content: &str) -> Result<(), StatsError> {
    fs::write(path, content).map_err(|e| StatsError::io(path, e))
}
