//! Typed views over one librdkafka statistics record.
//!
//! These types match the JSON emitted by librdkafka's statistics callback
//! (`statistics.interval.ms`). Only the fields needed for charting are kept;
//! everything else in the record is ignored. Extraction is permissive: a
//! missing or wrongly typed field takes its documented default.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::lenient;

/// Reserved value meaning "not assigned / not applicable".
pub const NOT_ASSIGNED: i64 = -1;
/// Reserved value meaning "offset unset" (librdkafka `RD_KAFKA_OFFSET_INVALID`).
pub const UNSET_OFFSET: i64 = -1001;

/// Returns true for the reserved sentinel values.
pub fn is_sentinel(value: i64) -> bool {
    value == NOT_ASSIGNED || value == UNSET_OFFSET
}

/// The kind of client that emitted the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientRole {
    Producer,
    Consumer,
    #[default]
    Unknown,
}

impl ClientRole {
    fn parse(s: &str) -> Self {
        match s {
            "producer" => ClientRole::Producer,
            "consumer" => ClientRole::Consumer,
            _ => ClientRole::Unknown,
        }
    }

    /// Returns the label used in summaries and debug dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientRole::Producer => "producer",
            ClientRole::Consumer => "consumer",
            ClientRole::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for ClientRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(lenient::string(deserializer)?
            .map(|s| ClientRole::parse(&s))
            .unwrap_or_default())
    }
}

/// Broker connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Up,
    Down,
    Init,
    Unknown,
}

impl BrokerState {
    fn parse(s: &str) -> Self {
        match s {
            "UP" => BrokerState::Up,
            "DOWN" => BrokerState::Down,
            "INIT" => BrokerState::Init,
            _ => BrokerState::Unknown,
        }
    }

    /// Ordinal used for charting: DOWN=-1, INIT=0, UP=1, anything else has none.
    pub fn ordinal(&self) -> Option<f64> {
        match self {
            BrokerState::Down => Some(-1.0),
            BrokerState::Init => Some(0.0),
            BrokerState::Up => Some(1.0),
            BrokerState::Unknown => None,
        }
    }
}

/// A point-in-time statistics snapshot.
///
/// `epoch_seconds` is the key used for ordering and deduplication;
/// `epoch_micros` only breaks ties between records of the same second.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    /// Wall clock time in seconds since the epoch (`time`).
    #[serde(rename = "time", default, deserialize_with = "lenient::int")]
    pub epoch_seconds: Option<i64>,

    /// Monotonic microsecond timestamp (`ts`).
    #[serde(rename = "ts", default, deserialize_with = "lenient::int")]
    pub epoch_micros: Option<i64>,

    #[serde(rename = "type", default)]
    pub client_role: ClientRole,

    /// Client instance name (`name`), e.g. `rdkafka#consumer-1`.
    #[serde(rename = "name", default, deserialize_with = "lenient::string")]
    pub client_name: Option<String>,

    /// Broker observations keyed by broker id (`host:port/nodeid`).
    #[serde(default, deserialize_with = "lenient::map")]
    pub brokers: BTreeMap<String, BrokerObservation>,

    /// Topic observations keyed by topic name.
    #[serde(default, deserialize_with = "lenient::map")]
    pub topics: BTreeMap<String, TopicObservation>,
}

impl Snapshot {
    /// Build a snapshot from a raw JSON value.
    ///
    /// Returns `None` if the value is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Merge another record of the same timestamp into this one.
    ///
    /// `self` is the anchor: keys it already has are never overwritten. New
    /// brokers, topics and partitions from `other` are added.
    pub fn merge(&mut self, other: Snapshot) {
        for (topic_name, topic) in other.topics {
            match self.topics.get_mut(&topic_name) {
                Some(existing) => {
                    for (partition_id, partition) in topic.partitions {
                        existing.partitions.entry(partition_id).or_insert(partition);
                    }
                }
                None => {
                    self.topics.insert(topic_name, topic);
                }
            }
        }

        for (broker_id, broker) in other.brokers {
            self.brokers.entry(broker_id).or_insert(broker);
        }
    }

    /// Iterate over brokers that are real network peers.
    pub fn network_brokers(&self) -> impl Iterator<Item = (&String, &BrokerObservation)> {
        self.brokers.iter().filter(|(_, b)| !b.is_logical())
    }
}

/// Statistics for one broker connection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BrokerObservation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,

    /// `"logical"` for bootstrap/internal entries, `"learned"` or `"configured"` otherwise.
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: Option<String>,

    /// Raw connection state string (`UP`, `DOWN`, `INIT`, `CONNECT`, ...).
    #[serde(default, deserialize_with = "lenient::string")]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "lenient::counter")]
    pub connects: i64,

    #[serde(default, deserialize_with = "lenient::counter")]
    pub disconnects: i64,

    #[serde(rename = "rxbytes", default, deserialize_with = "lenient::counter")]
    pub bytes_received: i64,

    #[serde(rename = "txbytes", default, deserialize_with = "lenient::counter")]
    pub bytes_sent: i64,

    #[serde(rename = "rxerrs", default, deserialize_with = "lenient::counter")]
    pub receive_errors: i64,

    #[serde(rename = "txerrs", default, deserialize_with = "lenient::counter")]
    pub send_errors: i64,

    #[serde(rename = "req_timeouts", default, deserialize_with = "lenient::counter")]
    pub request_timeouts: i64,

    /// Average round-trip time in microseconds (`rtt.avg`).
    #[serde(rename = "rtt", default, deserialize_with = "lenient::window_avg")]
    pub round_trip_avg_micros: Option<i64>,

    /// Average broker throttle time in microseconds (`throttle.avg`).
    #[serde(rename = "throttle", default, deserialize_with = "lenient::window_avg")]
    pub throttle_avg_micros: Option<i64>,
}

impl BrokerObservation {
    /// Bootstrap and internal entries are client bookkeeping, not peers.
    pub fn is_logical(&self) -> bool {
        self.source.as_deref() == Some("logical")
    }

    pub fn connection_state(&self) -> BrokerState {
        self.state.as_deref().map(BrokerState::parse).unwrap_or(BrokerState::Unknown)
    }
}

/// Statistics for one topic, as seen by this client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopicObservation {
    /// Partitions keyed by the partition id string.
    #[serde(default, deserialize_with = "lenient::map")]
    pub partitions: BTreeMap<String, PartitionObservation>,
}

/// Statistics for one topic partition.
///
/// Offsets and lags hold either a real value or one of the sentinels
/// [`NOT_ASSIGNED`] / [`UNSET_OFFSET`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartitionObservation {
    #[serde(default, deserialize_with = "lenient::int")]
    pub partition: Option<i64>,

    #[serde(rename = "leader", default, deserialize_with = "lenient::int")]
    pub leader_broker_id: Option<i64>,

    #[serde(default = "not_assigned", deserialize_with = "lenient::int_or_not_assigned")]
    pub consumer_lag: i64,

    #[serde(default = "not_assigned", deserialize_with = "lenient::int_or_not_assigned")]
    pub consumer_lag_stored: i64,

    #[serde(default = "unset_offset", deserialize_with = "lenient::int_or_unset")]
    pub committed_offset: i64,

    #[serde(default = "unset_offset", deserialize_with = "lenient::int_or_unset")]
    pub stored_offset: i64,

    #[serde(default = "not_assigned", deserialize_with = "lenient::int_or_not_assigned")]
    pub committed_leader_epoch: i64,
}

fn not_assigned() -> i64 {
    NOT_ASSIGNED
}

fn unset_offset() -> i64 {
    UNSET_OFFSET
}

impl Default for PartitionObservation {
    fn default() -> Self {
        Self {
            partition: None,
            leader_broker_id: None,
            consumer_lag: NOT_ASSIGNED,
            consumer_lag_stored: NOT_ASSIGNED,
            committed_offset: UNSET_OFFSET,
            stored_offset: UNSET_OFFSET,
            committed_leader_epoch: NOT_ASSIGNED,
        }
    }
}

impl PartitionObservation {
    /// Resolve the partition number, preferring the `partition` field over the map key.
    pub fn resolve_id(&self, key: &str) -> Option<i64> {
        self.partition.or_else(|| key.trim().parse().ok())
    }

    /// Partition `-1` is librdkafka's internal "unassigned" bucket.
    pub fn is_unassigned(&self, key: &str) -> bool {
        self.resolve_id(key) == Some(NOT_ASSIGNED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_snapshot() {
        let value = json!({
            "name": "rdkafka#consumer-1",
            "type": "consumer",
            "ts": 5_000_123,
            "time": 1_700_000_000,
            "brokers": {
                "kafka-g001:9092/1": {
                    "name": "kafka-g001:9092/1",
                    "source": "learned",
                    "state": "UP",
                    "connects": 1,
                    "rxbytes": 2048,
                    "txbytes": 1024,
                    "rtt": { "min": 100, "avg": 1500, "max": 3000 },
                    "throttle": { "avg": 0 }
                },
                "kafka:9092/bootstrap": { "source": "logical", "state": "INIT" }
            },
            "topics": {
                "orders": {
                    "topic": "orders",
                    "partitions": {
                        "0": { "partition": 0, "leader": 1, "consumer_lag": 12, "committed_offset": 400 },
                        "-1": { "partition": -1, "leader": -1 }
                    }
                }
            }
        });

        let snapshot = Snapshot::from_value(value).unwrap();
        assert_eq!(snapshot.epoch_seconds, Some(1_700_000_000));
        assert_eq!(snapshot.epoch_micros, Some(5_000_123));
        assert_eq!(snapshot.client_role, ClientRole::Consumer);
        assert_eq!(snapshot.client_name.as_deref(), Some("rdkafka#consumer-1"));

        let broker = &snapshot.brokers["kafka-g001:9092/1"];
        assert_eq!(broker.connection_state(), BrokerState::Up);
        assert_eq!(broker.bytes_received, 2048);
        assert_eq!(broker.round_trip_avg_micros, Some(1500));
        assert_eq!(broker.throttle_avg_micros, Some(0));
        assert_eq!(broker.disconnects, 0);
        assert!(!broker.is_logical());
        assert!(snapshot.brokers["kafka:9092/bootstrap"].is_logical());
        assert_eq!(snapshot.network_brokers().count(), 1);

        let partitions = &snapshot.topics["orders"].partitions;
        let p0 = &partitions["0"];
        assert_eq!(p0.consumer_lag, 12);
        assert_eq!(p0.committed_offset, 400);
        assert_eq!(p0.stored_offset, UNSET_OFFSET);
        assert_eq!(p0.consumer_lag_stored, NOT_ASSIGNED);
        assert_eq!(p0.committed_leader_epoch, NOT_ASSIGNED);
        assert!(partitions["-1"].is_unassigned("-1"));
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let value = json!({
            "time": "yesterday",
            "type": 7,
            "brokers": {
                "b1": { "state": 3, "rxbytes": "lots", "rtt": 12 },
                "b2": "not an object"
            },
            "topics": {
                "t1": { "partitions": { "0": { "consumer_lag": "?", "committed_offset": null } } },
                "t2": { "partitions": [] }
            }
        });

        let snapshot = Snapshot::from_value(value).unwrap();
        assert_eq!(snapshot.epoch_seconds, None);
        assert_eq!(snapshot.client_role, ClientRole::Unknown);
        assert_eq!(snapshot.brokers.len(), 1);

        let b1 = &snapshot.brokers["b1"];
        assert_eq!(b1.connection_state(), BrokerState::Unknown);
        assert_eq!(b1.bytes_received, 0);
        assert_eq!(b1.round_trip_avg_micros, None);

        let p0 = &snapshot.topics["t1"].partitions["0"];
        assert_eq!(p0.consumer_lag, NOT_ASSIGNED);
        assert_eq!(p0.committed_offset, UNSET_OFFSET);
        assert!(snapshot.topics["t2"].partitions.is_empty());
    }

    #[test]
    fn non_objects_are_not_snapshots() {
        assert!(Snapshot::from_value(json!([1, 2])).is_none());
        assert!(Snapshot::from_value(json!("text")).is_none());
        assert!(Snapshot::from_value(json!({})).is_some());
    }

    #[test]
    fn merge_keeps_anchor_values_and_adds_new_keys() {
        let mut anchor = Snapshot::from_value(json!({
            "time": 100,
            "brokers": { "b1": { "state": "UP" } },
            "topics": { "t1": { "partitions": { "0": { "consumer_lag": 5 } } } }
        }))
        .unwrap();
        let other = Snapshot::from_value(json!({
            "time": 100,
            "brokers": { "b1": { "state": "DOWN" }, "b2": { "state": "INIT" } },
            "topics": {
                "t1": { "partitions": { "0": { "consumer_lag": 99 }, "1": { "consumer_lag": 7 } } },
                "t2": { "partitions": { "0": { "consumer_lag": 1 } } }
            }
        }))
        .unwrap();

        anchor.merge(other);

        assert_eq!(anchor.brokers["b1"].connection_state(), BrokerState::Up);
        assert_eq!(anchor.brokers["b2"].connection_state(), BrokerState::Init);
        assert_eq!(anchor.topics["t1"].partitions["0"].consumer_lag, 5);
        assert_eq!(anchor.topics["t1"].partitions["1"].consumer_lag, 7);
        assert_eq!(anchor.topics["t2"].partitions["0"].consumer_lag, 1);
    }

    #[test]
    fn partition_id_falls_back_to_key() {
        let p = PartitionObservation::default();
        assert_eq!(p.resolve_id("3"), Some(3));
        assert_eq!(p.resolve_id("x"), None);
        assert!(p.is_unassigned("-1"));
        assert!(is_sentinel(-1001));
        assert!(!is_sentinel(0));
    }
}
