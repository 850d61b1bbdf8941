//! Time-series reconstruction from a snapshot sequence.
//!
//! Every broker and partition seen anywhere in the file gets one series per
//! metric, aligned to the shared timestamp list. A point is `None` where the
//! entity was not observed in that snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::DateTime;
use tracing::debug;

use super::metric::{BrokerMetric, PartitionMetric};
use crate::error::StatsError;
use crate::source::{BrokerObservation, ClientRole, PartitionObservation, Snapshot, NOT_ASSIGNED};

/// One value per timestamp index; `None` is a gap.
pub type Series = Vec<Option<f64>>;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Throughput in MiB/s between two readings of a cumulative byte counter.
///
/// A counter that went backwards (client restart, counter reset) contributes
/// zero rather than a negative rate. Elapsed time below one second counts as
/// one second.
pub fn rate_mib_per_sec(previous: i64, current: i64, elapsed_secs: i64) -> f64 {
    let delta = (i128::from(current) - i128::from(previous)).max(0);
    delta as f64 / elapsed_secs.max(1) as f64 / BYTES_PER_MIB
}

/// Last reading of a cumulative counter, for rate derivation.
#[derive(Debug, Clone, Copy, Default)]
struct CounterRate {
    last: Option<i64>,
}

impl CounterRate {
    /// Record a reading and return the rate since the last one, over
    /// `elapsed_secs` (the gap since the previous snapshot).
    ///
    /// The first reading has nothing to compare against and yields 0.
    fn observe(&mut self, current: i64, elapsed_secs: i64) -> f64 {
        let rate = match self.last {
            Some(previous) => rate_mib_per_sec(previous, current, elapsed_secs),
            None => 0.0,
        };
        self.last = Some(current);
        rate
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ByteRates {
    rx: CounterRate,
    tx: CounterRate,
}

/// Aligned series for one broker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerSeries {
    pub rtt_ms: Series,
    pub tx_rate: Series,
    pub rx_rate: Series,
    pub connects: Series,
    pub disconnects: Series,
    pub throttle_ms: Series,
    pub receive_errors: Series,
    pub send_errors: Series,
    pub request_timeouts: Series,
    /// DOWN=-1, INIT=0, UP=1.
    pub state: Series,
}

impl BrokerSeries {
    pub fn get(&self, metric: BrokerMetric) -> &Series {
        match metric {
            BrokerMetric::RoundTrip => &self.rtt_ms,
            BrokerMetric::TxRate => &self.tx_rate,
            BrokerMetric::RxRate => &self.rx_rate,
            BrokerMetric::Connects => &self.connects,
            BrokerMetric::Disconnects => &self.disconnects,
            BrokerMetric::Throttle => &self.throttle_ms,
            BrokerMetric::ReceiveErrors => &self.receive_errors,
            BrokerMetric::SendErrors => &self.send_errors,
            BrokerMetric::RequestTimeouts => &self.request_timeouts,
            BrokerMetric::State => &self.state,
        }
    }

    fn record(
        &mut self,
        observed: Option<&BrokerObservation>,
        elapsed_secs: i64,
        rates: &mut ByteRates,
    ) {
        let Some(broker) = observed else {
            for series in self.all_mut() {
                series.push(None);
            }
            return;
        };

        self.rtt_ms.push(broker.round_trip_avg_micros.map(micros_to_ms));
        self.tx_rate.push(Some(rates.tx.observe(broker.bytes_sent, elapsed_secs)));
        self.rx_rate.push(Some(rates.rx.observe(broker.bytes_received, elapsed_secs)));
        self.connects.push(Some(broker.connects as f64));
        self.disconnects.push(Some(broker.disconnects as f64));
        self.throttle_ms.push(broker.throttle_avg_micros.map(micros_to_ms));
        self.receive_errors.push(Some(broker.receive_errors as f64));
        self.send_errors.push(Some(broker.send_errors as f64));
        self.request_timeouts.push(Some(broker.request_timeouts as f64));
        self.state.push(broker.connection_state().ordinal());
    }

    fn all_mut(&mut self) -> [&mut Series; 10] {
        [
            &mut self.rtt_ms,
            &mut self.tx_rate,
            &mut self.rx_rate,
            &mut self.connects,
            &mut self.disconnects,
            &mut self.throttle_ms,
            &mut self.receive_errors,
            &mut self.send_errors,
            &mut self.request_timeouts,
            &mut self.state,
        ]
    }
}

/// Aligned series for one topic partition.
///
/// Sentinel values (`-1`, `-1001`) are kept as they were reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionSeries {
    pub committed_offset: Series,
    pub stored_offset: Series,
    pub committed_leader_epoch: Series,
    pub consumer_lag: Series,
    pub consumer_lag_stored: Series,
    /// Last known leader broker id, ignoring `-1`.
    pub leader_last: Option<i64>,
}

impl PartitionSeries {
    pub fn get(&self, metric: PartitionMetric) -> &Series {
        match metric {
            PartitionMetric::CommittedOffset => &self.committed_offset,
            PartitionMetric::StoredOffset => &self.stored_offset,
            PartitionMetric::CommittedLeaderEpoch => &self.committed_leader_epoch,
            PartitionMetric::ConsumerLag => &self.consumer_lag,
            PartitionMetric::StoredConsumerLag => &self.consumer_lag_stored,
        }
    }

    fn record(&mut self, observed: Option<&PartitionObservation>) {
        let value = |v: i64| observed.map(|_| v as f64);
        let p = observed.cloned().unwrap_or_default();

        self.committed_offset.push(value(p.committed_offset));
        self.stored_offset.push(value(p.stored_offset));
        self.committed_leader_epoch.push(value(p.committed_leader_epoch));
        self.consumer_lag.push(value(p.consumer_lag));
        self.consumer_lag_stored.push(value(p.consumer_lag_stored));

        if let Some(leader) = p.leader_broker_id.filter(|&l| l != NOT_ASSIGNED) {
            self.leader_last = Some(leader);
        }
    }
}

/// The normalized time-series bundle.
///
/// Built once from a chronologically ordered snapshot sequence and read-only
/// afterwards. Every series has exactly `timestamps.len()` points.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// Seconds since the epoch, ascending.
    pub timestamps: Vec<i64>,
    pub client_role: ClientRole,
    /// Series per broker id (logical brokers excluded).
    pub brokers: BTreeMap<String, BrokerSeries>,
    /// Series per topic, then per partition id (partition `-1` excluded).
    pub topics: BTreeMap<String, BTreeMap<i64, PartitionSeries>>,
}

impl History {
    /// Fold snapshots into aligned series.
    ///
    /// Snapshots without a timestamp are ignored. Fewer than two timestamped
    /// snapshots is [`StatsError::InsufficientData`]: a single point cannot
    /// carry a rate or a line.
    pub fn build(snapshots: &[Snapshot]) -> Result<Self, StatsError> {
        let plottable: Vec<(i64, &Snapshot)> = snapshots
            .iter()
            .filter_map(|s| s.epoch_seconds.map(|time| (time, s)))
            .collect();

        if plottable.len() < 2 {
            return Err(StatsError::InsufficientData {
                found: plottable.len(),
            });
        }

        // Universe of entities seen anywhere in the sequence
        let mut broker_ids: BTreeSet<&str> = BTreeSet::new();
        let mut partition_ids: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();
        for (_, snapshot) in &plottable {
            broker_ids.extend(snapshot.network_brokers().map(|(id, _)| id.as_str()));
            for (topic, partitions) in partitions_by_id(snapshot) {
                if !partitions.is_empty() {
                    partition_ids.entry(topic).or_default().extend(partitions.keys());
                }
            }
        }

        let points = plottable.len();
        let mut brokers: BTreeMap<String, BrokerSeries> = BTreeMap::new();
        let mut rates: HashMap<&str, ByteRates> = HashMap::new();
        let mut topics: BTreeMap<String, BTreeMap<i64, PartitionSeries>> = BTreeMap::new();

        let mut previous_time: Option<i64> = None;
        for &(time, snapshot) in &plottable {
            // Rates span the gap since the previous snapshot, even for a
            // broker that was absent from it
            let elapsed = previous_time.map_or(1, |previous| time.saturating_sub(previous));
            previous_time = Some(time);

            for &id in &broker_ids {
                let observed = snapshot.brokers.get(id).filter(|b| !b.is_logical());
                brokers.entry(id.to_string()).or_default().record(
                    observed,
                    elapsed,
                    rates.entry(id).or_default(),
                );
            }

            let observed_partitions = partitions_by_id(snapshot);
            for (&topic, ids) in &partition_ids {
                let observed_topic = observed_partitions.get(topic);
                let series = topics.entry(topic.to_string()).or_default();
                for &id in ids {
                    let observed = observed_topic.and_then(|p| p.get(&id)).copied();
                    series.entry(id).or_default().record(observed);
                }
            }
        }

        debug!(
            points,
            brokers = brokers.len(),
            topics = topics.len(),
            "built time series"
        );

        Ok(Self {
            timestamps: plottable.iter().map(|(time, _)| *time).collect(),
            client_role: plottable[0].1.client_role,
            brokers,
            topics,
        })
    }

    /// Number of aligned points in every series.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// One series per partition of `topic` for the given metric.
    pub fn partition_series(
        &self,
        topic: &str,
        metric: PartitionMetric,
    ) -> BTreeMap<i64, &Series> {
        self.topics
            .get(topic)
            .map(|partitions| partitions.iter().map(|(id, p)| (*id, p.get(metric))).collect())
            .unwrap_or_default()
    }
}

/// ISO-8601 UTC rendering of an epoch timestamp, without offset suffix.
pub fn iso_timestamp(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}

fn micros_to_ms(micros: i64) -> f64 {
    micros as f64 / 1000.0
}

/// Assigned partitions of each topic, keyed by numeric partition id.
fn partitions_by_id(snapshot: &Snapshot) -> BTreeMap<&str, BTreeMap<i64, &PartitionObservation>> {
    let mut result = BTreeMap::new();
    for (topic_name, topic) in &snapshot.topics {
        let mut partitions = BTreeMap::new();
        for (key, partition) in &topic.partitions {
            match partition.resolve_id(key) {
                Some(NOT_ASSIGNED) => {}
                Some(id) => {
                    partitions.entry(id).or_insert(partition);
                }
                None => debug!(topic = %topic_name, key = %key, "skipping partition without an id"),
            }
        }
        result.insert(topic_name.as_str(), partitions);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::load;

    fn history(text: &str) -> History {
        let loaded = load(text).unwrap();
        History::build(&loaded.snapshots).unwrap()
    }

    fn broker(time: i64, rx: i64, tx: i64) -> String {
        format!(
            r#"{{"time":{time},"type":"producer","brokers":{{"b1":{{"state":"UP","rxbytes":{rx},"txbytes":{tx},"rtt":{{"avg":2500}}}}}}}}"#
        )
    }

    #[test]
    fn fewer_than_two_snapshots_is_insufficient() {
        let loaded = load(&broker(100, 0, 0)).unwrap();
        let result = History::build(&loaded.snapshots);
        assert!(matches!(result, Err(StatsError::InsufficientData { found: 1 })));

        let result = History::build(&[]);
        assert!(matches!(result, Err(StatsError::InsufficientData { found: 0 })));
    }

    #[test]
    fn untimestamped_snapshots_do_not_count() {
        let snapshots = vec![
            Snapshot::default(),
            Snapshot {
                epoch_seconds: Some(100),
                ..Default::default()
            },
        ];
        assert!(matches!(
            History::build(&snapshots),
            Err(StatsError::InsufficientData { found: 1 })
        ));
    }

    #[test]
    fn rate_is_derived_from_cumulative_bytes() {
        let h = history(&format!("{}{}", broker(100, 1_000_000, 0), broker(160, 2_048_000, 0)));

        let rx = &h.brokers["b1"].rx_rate;
        assert_eq!(rx[0], Some(0.0));
        let expected = (2_048_000.0 - 1_000_000.0) / 60.0 / (1024.0 * 1024.0);
        assert!((rx[1].unwrap() - expected).abs() < 1e-12);
        assert!((rx[1].unwrap() - 0.016_657).abs() < 1e-5);
    }

    #[test]
    fn counter_reset_yields_zero_rate() {
        let h = history(&format!(
            "{}{}{}",
            broker(100, 5_000_000, 900),
            broker(110, 1_000, 100),
            broker(120, 1_049_576, 100)
        ));

        let b1 = &h.brokers["b1"];
        assert_eq!(b1.rx_rate[1], Some(0.0));
        assert_eq!(b1.tx_rate[1], Some(0.0));
        // After the reset the new baseline is used
        assert!((b1.rx_rate[2].unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert_eq!(rate_mib_per_sec(i64::MAX, i64::MIN, 1), 0.0);
        let wide = rate_mib_per_sec(i64::MIN, i64::MAX, i64::MIN);
        assert!(wide.is_finite() && wide > 0.0);

        let h = history(concat!(
            r#"{"time":-9223372036854775808,"brokers":{"b1":{"rxbytes":-9000000000000000000}}}"#,
            r#"{"time":9223372036854775807,"brokers":{"b1":{"rxbytes":9000000000000000000}}}"#
        ));
        let rx = h.brokers["b1"].rx_rate[1].unwrap();
        assert!(rx.is_finite() && rx > 0.0);
    }

    #[test]
    fn rtt_is_stored_in_milliseconds() {
        let h = history(&format!("{}{}", broker(100, 0, 0), broker(101, 0, 0)));
        assert_eq!(h.brokers["b1"].rtt_ms, vec![Some(2.5), Some(2.5)]);
        assert_eq!(h.brokers["b1"].throttle_ms, vec![None, None]);
        assert_eq!(h.client_role, ClientRole::Producer);
    }

    #[test]
    fn state_maps_to_ordinals() {
        let h = history(concat!(
            r#"{"time":1,"brokers":{"b1":{"state":"DOWN"}}}"#,
            r#"{"time":2,"brokers":{"b1":{"state":"INIT"}}}"#,
            r#"{"time":3,"brokers":{"b1":{"state":"UP"}}}"#,
            r#"{"time":4,"brokers":{"b1":{"state":"CONNECT"}}}"#
        ));
        assert_eq!(h.brokers["b1"].state, vec![Some(-1.0), Some(0.0), Some(1.0), None]);
    }

    #[test]
    fn missing_brokers_become_gaps() {
        let h = history(concat!(
            r#"{"time":100,"brokers":{"b1":{"state":"UP","rxbytes":0},"b2":{"state":"UP"}}}"#,
            r#"{"time":160,"brokers":{"b2":{"state":"UP"}}}"#,
            r#"{"time":220,"brokers":{"b1":{"state":"UP","rxbytes":600}}}"#
        ));

        assert_eq!(h.len(), 3);
        let b1 = &h.brokers["b1"];
        assert_eq!(b1.state, vec![Some(1.0), None, Some(1.0)]);
        assert_eq!(b1.rx_rate[1], None);
        // Bytes since the last reading, over the gap since the previous snapshot
        let expected = 600.0 / 60.0 / (1024.0 * 1024.0);
        assert!((b1.rx_rate[2].unwrap() - expected).abs() < 1e-12);

        let b2 = &h.brokers["b2"];
        assert_eq!(b2.state, vec![Some(1.0), Some(1.0), None]);
        for metric in BrokerMetric::ALL {
            assert_eq!(b1.get(metric).len(), 3);
        }
    }

    #[test]
    fn logical_brokers_are_excluded() {
        let h = history(concat!(
            r#"{"time":1,"brokers":{"boot/bootstrap":{"source":"logical"},"b1":{"state":"UP"}}}"#,
            r#"{"time":2,"brokers":{"b1":{"state":"UP"}}}"#
        ));
        assert_eq!(h.brokers.keys().collect::<Vec<_>>(), vec!["b1"]);
    }

    #[test]
    fn partitions_keep_sentinels_and_skip_unassigned() {
        let h = history(concat!(
            r#"{"time":1,"type":"consumer","topics":{"t1":{"partitions":{"#,
            r#""0":{"partition":0,"leader":3,"consumer_lag":5,"committed_offset":100},"#,
            r#""-1":{"partition":-1,"consumer_lag":1}}}}}"#,
            r#"{"time":2,"type":"consumer","topics":{"t1":{"partitions":{"#,
            r#""0":{"partition":0,"leader":-1},"1":{"partition":1,"consumer_lag":9}}}}}"#
        ));

        let partitions = &h.topics["t1"];
        assert_eq!(partitions.keys().copied().collect::<Vec<_>>(), vec![0, 1]);

        let p0 = &partitions[&0];
        assert_eq!(p0.consumer_lag, vec![Some(5.0), Some(-1.0)]);
        assert_eq!(p0.committed_offset, vec![Some(100.0), Some(-1001.0)]);
        assert_eq!(p0.stored_offset, vec![Some(-1001.0), Some(-1001.0)]);
        assert_eq!(p0.leader_last, Some(3));

        let p1 = &partitions[&1];
        assert_eq!(p1.consumer_lag, vec![None, Some(9.0)]);
        assert_eq!(p1.leader_last, None);

        assert_eq!(h.partition_series("t1", PartitionMetric::ConsumerLag).len(), 2);
        assert!(h.partition_series("missing", PartitionMetric::ConsumerLag).is_empty());
    }

    #[test]
    fn topics_without_assigned_partitions_have_no_series() {
        let h = history(concat!(
            r#"{"time":1,"topics":{"idle":{"partitions":{"-1":{"partition":-1}}}}}"#,
            r#"{"time":2,"topics":{}}"#
        ));
        assert!(h.topics.is_empty());
    }

    #[test]
    fn rate_never_negative() {
        assert_eq!(rate_mib_per_sec(10, 5, 1), 0.0);
        assert_eq!(rate_mib_per_sec(0, 1024 * 1024, 0), 1.0);
        assert_eq!(rate_mib_per_sec(0, 2 * 1024 * 1024, 2), 1.0);
    }

    #[test]
    fn timestamps_are_utc() {
        assert_eq!(iso_timestamp(60), "1970-01-01T00:01:00");
        assert_eq!(iso_timestamp(1_700_000_000), "2023-11-14T22:13:20");
    }
}
