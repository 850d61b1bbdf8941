//! Plain-text summary of the most recent snapshot.

use std::fmt::Write;

use super::history::iso_timestamp;
use crate::source::{Snapshot, NOT_ASSIGNED};

/// Render the console summary for `latest`.
///
/// Logical brokers and the unassigned partition bucket are left out.
pub fn render_summary(latest: Option<&Snapshot>) -> String {
    let Some(snapshot) = latest else {
        return "No stats available.\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n--- Latest Statistics Summary ---");
    let timestamp = snapshot
        .epoch_seconds
        .map(iso_timestamp)
        .unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "Timestamp: {timestamp}");
    let _ = writeln!(
        out,
        "Client: {} ({})",
        snapshot.client_name.as_deref().unwrap_or("N/A"),
        snapshot.client_role.as_str()
    );

    let _ = writeln!(out, "\nBrokers:");
    for (id, broker) in snapshot.network_brokers() {
        let rtt = broker
            .round_trip_avg_micros
            .map(|us| format!("{:?}", us as f64 / 1000.0))
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            out,
            "  - {id}: State={}, RTT(avg)={rtt} ms",
            broker.state.as_deref().unwrap_or("N/A")
        );
    }

    let _ = writeln!(out, "\nTopics:");
    for (name, topic) in &snapshot.topics {
        let _ = writeln!(out, "  - {name}:");

        let mut partitions: Vec<_> = topic
            .partitions
            .iter()
            .filter(|(key, p)| !p.is_unassigned(key))
            .collect();
        partitions.sort_by_key(|(key, p)| p.resolve_id(key).unwrap_or(NOT_ASSIGNED));

        for (key, partition) in partitions {
            let leader = partition
                .leader_broker_id
                .map(|l| l.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let lag = match partition.consumer_lag {
                NOT_ASSIGNED => "N/A".to_string(),
                lag => lag.to_string(),
            };
            let _ = writeln!(
                out,
                "    - Partition {key}: Leader={leader}, Consumer Lag={lag}"
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_snapshot() {
        assert_eq!(render_summary(None), "No stats available.\n");
    }

    #[test]
    fn summary_lists_brokers_and_partitions() {
        let snapshot = Snapshot::from_value(json!({
            "name": "rdkafka#consumer-1",
            "type": "consumer",
            "time": 1_700_000_000,
            "brokers": {
                "b2:9092/2": { "state": "DOWN" },
                "b1:9092/1": { "state": "UP", "rtt": { "avg": 1500 } },
                "b:9092/bootstrap": { "source": "logical", "state": "INIT" }
            },
            "topics": {
                "orders": {
                    "partitions": {
                        "10": { "partition": 10, "leader": 1, "consumer_lag": 3 },
                        "2": { "partition": 2, "leader": 2 },
                        "-1": { "partition": -1 }
                    }
                }
            }
        }))
        .unwrap();

        let text = render_summary(Some(&snapshot));
        let expected = "\n--- Latest Statistics Summary ---\n\
            Timestamp: 2023-11-14T22:13:20\n\
            Client: rdkafka#consumer-1 (consumer)\n\
            \n\
            Brokers:\n  \
            - b1:9092/1: State=UP, RTT(avg)=1.5 ms\n  \
            - b2:9092/2: State=DOWN, RTT(avg)=N/A ms\n\
            \n\
            Topics:\n  \
            - orders:\n    \
            - Partition 2: Leader=2, Consumer Lag=N/A\n    \
            - Partition 10: Leader=1, Consumer Lag=3\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn missing_time_prints_placeholder() {
        let snapshot = Snapshot::default();
        let text = render_summary(Some(&snapshot));
        assert!(text.contains("Timestamp: N/A"));
        assert!(text.contains("Client: N/A (unknown)"));
    }
}
