//! # statwatch
//!
//! Time-series charts and diagnostics for librdkafka client statistics.
//!
//! librdkafka clients can periodically emit a JSON statistics object. This
//! crate loads a file of those objects, rebuilds aligned per-broker and
//! per-partition time series from them, and renders one chart per metric,
//! either into text artifacts or into an interactive terminal browser.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │ source  │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (input) │    │ (series) │    │(charts) │    │ or files │  │
//! │  └─────────┘    └────┬─────┘    └─────────┘    └──────────┘  │
//! │                      │                                       │
//! │                      ▼                                       │
//! │                 ┌─────────┐                                  │
//! │                 │ export  │──▶ debug CSV / summaries / dump  │
//! │                 └─────────┘                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Lenient parsing of concatenated or line-delimited JSON,
//!   and deduplication into one [`Snapshot`] per timestamp
//! - **[`data`]**: The aligned series bundle ([`History`]), byte-rate
//!   derivation, series diagnostics ([`SeriesStats`]) and chart planning
//! - **[`ui`]**: Chart rendering using ratatui, for both the TUI and the
//!   headless text artifacts
//! - **[`export`]**: Debug artifacts (per-chart CSV, summaries, raw dump)
//! - **[`app`]**: Interactive browser state and navigation
//! - **[`config`]**: Layered [`Settings`] (defaults, TOML file, environment)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Print the latest snapshot summary and write charts to kafka_graphs/
//! statwatch stats.json --graph
//!
//! # Also write debug data, and keep series with no data at all
//! statwatch stats.json --graph --debug-data --show-empty
//!
//! # Browse the charts interactively
//! statwatch stats.json --interactive
//! ```
//!
//! ### As a library
//!
//! ```
//! use statwatch::{load, plan_pages, History, SeriesStats};
//!
//! let text = r#"
//! {"time": 100, "type": "consumer", "brokers": {"k:9092/1": {"state": "UP", "rxbytes": 0}}}
//! {"time": 160, "type": "consumer", "brokers": {"k:9092/1": {"state": "UP", "rxbytes": 1048576}}}
//! "#;
//!
//! let loaded = load(text).unwrap();
//! let history = History::build(&loaded.snapshots).unwrap();
//! assert_eq!(history.len(), 2);
//!
//! let pages = plan_pages(&history, false);
//! assert_eq!(pages[0].title(), "Brokers");
//!
//! let rx = &history.brokers["k:9092/1"].rx_rate;
//! let stats = SeriesStats::classify(rx);
//! assert_eq!(stats.valid_count, 2);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    plan_pages, render_summary, History, Page, PanelData, SentinelPolicy, SeriesStats,
    SeriesStatus,
};
pub use error::StatsError;
pub use export::export_debug;
pub use source::{deduplicate, load, load_file, LoadedStats, Snapshot};
pub use ui::chart::{ChartOptions, ChartPanel};
pub use ui::headless::{write_pages, ChartSize};
