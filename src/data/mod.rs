//! Time-series reconstruction and series diagnostics.
//!
//! This module turns the ordered snapshot sequence produced by
//! [`crate::source`] into aligned series and classifies each series for
//! rendering.
//!
//! ## Submodules
//!
//! - [`history`]: The aligned series bundle ([`History`]) and rate derivation
//! - [`diagnostics`]: Per-series statistics ([`SeriesStats`]) and legend text
//! - [`metric`]: The fixed catalogue of broker and partition metrics
//! - [`panel`]: Chart planning ([`Page`], [`PanelData`]) shared by rendering and export
//! - [`summary`]: Console summary of the latest snapshot
//!
//! ## Data Flow
//!
//! ```text
//! Vec<Snapshot> (deduplicated)
//!        │
//!        ▼
//! History::build()
//!        │
//!        ├──▶ BrokerSeries   (per broker id, one Series per BrokerMetric)
//!        │
//!        └──▶ PartitionSeries (per topic/partition, one Series per PartitionMetric)
//!                  │
//!                  ▼
//!        SeriesStats::classify_with(series, metric.sentinel_policy())
//! ```

pub mod diagnostics;
pub mod history;
pub mod metric;
pub mod panel;
pub mod summary;

pub use diagnostics::{format_constant, legend_label, SentinelPolicy, SeriesStats, SeriesStatus};
pub use history::{iso_timestamp, rate_mib_per_sec, BrokerSeries, History, PartitionSeries, Series};
pub use metric::{AxisScale, BrokerMetric, DrawStyle, PartitionMetric};
pub use panel::{
    partition_label, plan_pages, pretty_broker_label, MetricKind, NamedSeries, Page, PageKind,
    PanelData,
};
pub use summary::render_summary;
