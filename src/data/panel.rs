//! Chart planning: which series go on which chart, under which label.
//!
//! A [`Page`] groups the charts written to one artifact (the broker page, or
//! one page per consumed topic). Each [`PanelData`] borrows its series from
//! the [`History`] and carries the diagnostics computed for them, so the
//! renderer and the debug exporter see the same selection.

use std::sync::LazyLock;

use regex::Regex;

use super::diagnostics::{SentinelPolicy, SeriesStats};
use super::history::{History, Series};
use super::metric::{AxisScale, BrokerMetric, DrawStyle, PartitionMetric};
use crate::source::ClientRole;

static BROKER_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(g\d{3,})").expect("valid regex"));
static BROKER_NODE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)$").expect("valid regex"));

/// Human-friendly broker label.
///
/// - `host:9092/bootstrap` → `Bootstrap`
/// - `kafka-g012:9092/5` → `Broker #5 (g012)`
/// - `host:9092/5` → `Broker #5`
/// - anything else is returned unchanged
pub fn pretty_broker_label(id: &str) -> String {
    if id.ends_with("/bootstrap") {
        return "Bootstrap".to_string();
    }
    let group = BROKER_GROUP.captures(id).map(|c| c[1].to_string());
    let node = BROKER_NODE_ID.captures(id).map(|c| c[1].to_string());
    match (node, group) {
        (Some(node), Some(group)) => format!("Broker #{node} ({group})"),
        (Some(node), None) => format!("Broker #{node}"),
        _ => id.to_string(),
    }
}

/// `Partition <id>`, plus the last known leader when there is one.
pub fn partition_label(partition: i64, leader: Option<i64>) -> String {
    match leader {
        Some(leader) => format!("Partition {partition} (Leader {leader})"),
        None => format!("Partition {partition}"),
    }
}

/// The metric a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Broker(BrokerMetric),
    Partition(PartitionMetric),
}

impl MetricKind {
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::Broker(m) => m.title(),
            MetricKind::Partition(m) => m.title(),
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            MetricKind::Broker(m) => m.y_label(),
            MetricKind::Partition(m) => m.y_label(),
        }
    }

    pub fn axis(&self) -> AxisScale {
        match self {
            MetricKind::Broker(m) => m.axis(),
            MetricKind::Partition(m) => m.axis(),
        }
    }

    pub fn draw_style(&self) -> DrawStyle {
        match self {
            MetricKind::Broker(m) => m.draw_style(),
            MetricKind::Partition(m) => m.draw_style(),
        }
    }

    pub fn integer_valued(&self) -> bool {
        match self {
            MetricKind::Broker(m) => m.integer_valued(),
            MetricKind::Partition(m) => m.integer_valued(),
        }
    }

    pub fn sentinel_policy(&self) -> SentinelPolicy {
        match self {
            MetricKind::Broker(m) => m.sentinel_policy(),
            MetricKind::Partition(m) => m.sentinel_policy(),
        }
    }
}

/// One series placed on a chart.
#[derive(Debug, Clone)]
pub struct NamedSeries<'a> {
    /// Stable name: the broker id, or the partition label.
    pub key: String,
    /// Legend name before annotation.
    pub label: String,
    pub values: &'a Series,
    pub stats: SeriesStats,
}

/// The data for one chart.
#[derive(Debug, Clone)]
pub struct PanelData<'a> {
    pub title: String,
    pub metric: MetricKind,
    /// Visible series, sorted by key.
    pub series: Vec<NamedSeries<'a>>,
    /// Series left out because they held no observation at all.
    pub hidden: usize,
}

impl PanelData<'_> {
    /// Number of visible series that are flat.
    pub fn constant_count(&self) -> usize {
        self.series
            .iter()
            .filter(|s| s.stats.valid_count > 0 && s.stats.is_constant)
            .count()
    }

    /// Every valid value across the visible series.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        let policy = self.metric.sentinel_policy();
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .filter(move |v| !v.is_nan() && !policy.is_sentinel(*v))
    }
}

/// What a page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Brokers,
    Topic(String),
}

/// A group of charts written to one artifact.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub kind: PageKind,
    pub panels: Vec<PanelData<'a>>,
}

impl Page<'_> {
    pub fn title(&self) -> String {
        match &self.kind {
            PageKind::Brokers => "Brokers".to_string(),
            PageKind::Topic(name) => name.clone(),
        }
    }

    /// Artifact file stem: `broker_metrics` or `topic_<name>` with dots replaced.
    pub fn file_stem(&self) -> String {
        match &self.kind {
            PageKind::Brokers => "broker_metrics".to_string(),
            PageKind::Topic(name) => format!("topic_{}", name.replace('.', "_")),
        }
    }

    /// Debug sub-directory for this page's charts.
    pub fn debug_dir(&self) -> &'static str {
        match self.kind {
            PageKind::Brokers => "brokers",
            PageKind::Topic(_) => "topics",
        }
    }
}

/// Plan every page for a bundle.
///
/// The broker page always comes first. Topic pages are only produced for
/// consumer statistics. Series with no observation are dropped unless
/// `include_empty` is set; all-sentinel series are always kept.
pub fn plan_pages(history: &History, include_empty: bool) -> Vec<Page<'_>> {
    let mut pages = vec![Page {
        kind: PageKind::Brokers,
        panels: BrokerMetric::ALL
            .iter()
            .map(|&metric| broker_panel(history, metric, include_empty))
            .collect(),
    }];

    if history.client_role == ClientRole::Consumer {
        for topic in history.topics.keys() {
            pages.push(Page {
                kind: PageKind::Topic(topic.clone()),
                panels: PartitionMetric::ALL
                    .iter()
                    .map(|&metric| partition_panel(history, topic, metric, include_empty))
                    .collect(),
            });
        }
    }

    pages
}

fn broker_panel(history: &History, metric: BrokerMetric, include_empty: bool) -> PanelData<'_> {
    let candidates = history.brokers.iter().map(|(id, series)| NamedSeries {
        key: id.clone(),
        label: pretty_broker_label(id),
        values: series.get(metric),
        stats: SeriesStats::classify_with(series.get(metric), metric.sentinel_policy()),
    });
    select(metric.title().to_string(), MetricKind::Broker(metric), candidates, include_empty)
}

fn partition_panel<'a>(
    history: &'a History,
    topic: &str,
    metric: PartitionMetric,
    include_empty: bool,
) -> PanelData<'a> {
    let partitions = history.topics.get(topic).into_iter().flatten();
    let candidates = partitions.map(|(&id, series)| {
        let label = partition_label(id, series.leader_last);
        NamedSeries {
            key: label.clone(),
            label,
            values: series.get(metric),
            stats: SeriesStats::classify_with(series.get(metric), metric.sentinel_policy()),
        }
    });
    select(
        format!("{topic}: {}", metric.title()),
        MetricKind::Partition(metric),
        candidates,
        include_empty,
    )
}

fn select<'a>(
    title: String,
    metric: MetricKind,
    candidates: impl Iterator<Item = NamedSeries<'a>>,
    include_empty: bool,
) -> PanelData<'a> {
    let (series, dropped): (Vec<_>, Vec<_>) =
        candidates.partition(|s| include_empty || s.stats.has_observations());
    PanelData {
        title,
        metric,
        series,
        hidden: dropped.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::load;

    fn consumer_history() -> History {
        let text = concat!(
            r#"{"time":100,"type":"consumer","brokers":{"k-g007:9092/1":{"state":"UP"},"k:9092/2":{"state":"UP"}},"#,
            r#""topics":{"a.b":{"partitions":{"0":{"partition":0,"leader":1,"consumer_lag":4},"1":{"partition":1}}}}}"#,
            r#"{"time":160,"type":"consumer","brokers":{"k-g007:9092/1":{"state":"UP"}},"#,
            r#""topics":{"a.b":{"partitions":{"0":{"partition":0,"leader":1,"consumer_lag":6}}}}}"#
        );
        History::build(&load(text).unwrap().snapshots).unwrap()
    }

    #[test]
    fn broker_labels() {
        assert_eq!(pretty_broker_label("kafka:9092/bootstrap"), "Bootstrap");
        assert_eq!(pretty_broker_label("kafka-g012:9092/5"), "Broker #5 (g012)");
        assert_eq!(pretty_broker_label("kafka:9092/5"), "Broker #5");
        assert_eq!(pretty_broker_label("kafka-g01:9092"), "kafka-g01:9092");
    }

    #[test]
    fn partition_labels() {
        assert_eq!(partition_label(3, Some(7)), "Partition 3 (Leader 7)");
        assert_eq!(partition_label(0, None), "Partition 0");
    }

    #[test]
    fn consumer_gets_one_page_per_topic() {
        let history = consumer_history();
        let pages = plan_pages(&history, false);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].file_stem(), "broker_metrics");
        assert_eq!(pages[0].panels.len(), BrokerMetric::ALL.len());
        assert_eq!(pages[1].kind, PageKind::Topic("a.b".to_string()));
        assert_eq!(pages[1].file_stem(), "topic_a_b");
        assert_eq!(pages[1].panels[0].title, "a.b: Committed Offset");
    }

    #[test]
    fn empty_series_are_hidden_unless_requested() {
        let history = consumer_history();

        let pages = plan_pages(&history, false);
        let rtt = &pages[0].panels[0];
        assert_eq!(rtt.metric, MetricKind::Broker(BrokerMetric::RoundTrip));
        assert!(rtt.series.is_empty());
        assert_eq!(rtt.hidden, 2);

        let pages = plan_pages(&history, true);
        assert_eq!(pages[0].panels[0].series.len(), 2);
        assert_eq!(pages[0].panels[0].hidden, 0);
    }

    #[test]
    fn not_assigned_partitions_stay_visible() {
        let history = consumer_history();
        let pages = plan_pages(&history, false);
        let lag = &pages[1].panels[3];

        assert_eq!(lag.metric, MetricKind::Partition(PartitionMetric::ConsumerLag));
        let keys: Vec<_> = lag.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Partition 0 (Leader 1)", "Partition 1"]);
        assert_eq!(lag.hidden, 0);
        assert_eq!(lag.valid_values().collect::<Vec<_>>(), vec![4.0, 6.0]);
    }

    #[test]
    fn producers_only_get_broker_page() {
        let text = concat!(
            r#"{"time":1,"type":"producer","topics":{"t":{"partitions":{"0":{"partition":0}}}}}"#,
            r#"{"time":2,"type":"producer"}"#
        );
        let history = History::build(&load(text).unwrap().snapshots).unwrap();
        let pages = plan_pages(&history, false);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title(), "Brokers");
    }
}
