//! Decoding and deduplication of statistics files.
//!
//! A statistics file may hold a single JSON object, a JSON array of objects,
//! or objects simply concatenated one after another (the usual result of
//! appending every statistics callback to a log file). Some frameworks also
//! flush one logical snapshot as several objects sharing the same `time`;
//! those fragments are merged back together here.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::snapshot::Snapshot;
use crate::error::StatsError;

/// Result of loading a statistics file.
#[derive(Debug, Clone, Default)]
pub struct LoadedStats {
    /// Every record recovered, in sort order, before deduplication.
    ///
    /// Includes records without a timestamp, which never reach `snapshots`.
    pub raw: Vec<Snapshot>,
    /// Timestamped snapshots in chronological order, one per second.
    pub snapshots: Vec<Snapshot>,
    /// Set when sequential decoding stopped at an undecodable value.
    pub truncated: bool,
}

impl LoadedStats {
    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Parse raw statistics text into ordered, deduplicated snapshots.
///
/// Only fails when not a single statistics object can be recovered. A file
/// that is cut off part-way keeps everything decoded before the cut.
pub fn load(text: &str) -> Result<LoadedStats, StatsError> {
    let (values, truncated) = decode_values(text);

    let mut raw: Vec<Snapshot> = values
        .into_iter()
        .flat_map(records)
        .filter_map(|value| {
            let snapshot = Snapshot::from_value(value);
            if snapshot.is_none() {
                warn!("skipping statistics record that is not a JSON object");
            }
            snapshot
        })
        .collect();

    if raw.is_empty() {
        return Err(StatsError::MalformedInput(
            "no statistics object found in input".to_string(),
        ));
    }

    sort_snapshots(&mut raw);
    let snapshots = deduplicate(raw.iter().cloned());

    let timestamped = raw.iter().filter(|s| s.epoch_seconds.is_some()).count();
    if timestamped < raw.len() {
        debug!(
            dropped = raw.len() - timestamped,
            "dropping records without a timestamp"
        );
    }
    if snapshots.len() < timestamped {
        info!(
            "Deduplicated {} records down to {} unique timestamps (merged data from duplicates)",
            timestamped,
            snapshots.len()
        );
    }

    Ok(LoadedStats {
        raw,
        snapshots,
        truncated,
    })
}

/// Decode the input as one document, falling back to a sequence of documents.
fn decode_values(text: &str) -> (Vec<Value>, bool) {
    let whole_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => return (vec![value], false),
        Err(e) => e,
    };
    debug!(error = %whole_error, "input is not a single JSON document, decoding sequentially");

    let mut values = Vec::new();
    let mut truncated = false;
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();

    while let Some(next) = stream.next() {
        match next {
            Ok(value) => values.push(value),
            Err(e) => {
                debug!(
                    offset = stream.byte_offset(),
                    recovered = values.len(),
                    error = %e,
                    "stopping at undecodable value"
                );
                truncated = true;
                break;
            }
        }
    }

    (values, truncated)
}

/// An array holds one record per element; anything else is a single record.
fn records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Sort by `epoch_seconds`, breaking ties with `epoch_micros`.
///
/// Missing timestamps count as 0 and sort first. The sort is stable, so
/// records with identical keys keep their input order.
pub fn sort_snapshots(snapshots: &mut [Snapshot]) {
    snapshots.sort_by_key(|s| (s.epoch_seconds.unwrap_or(0), s.epoch_micros.unwrap_or(0)));
}

/// Merge records sharing an `epoch_seconds` into the first one seen.
///
/// Records without a timestamp cannot be keyed and are dropped. The result is
/// ordered by `epoch_seconds` and holds at most one snapshot per second.
pub fn deduplicate<I>(records: I) -> Vec<Snapshot>
where
    I: IntoIterator<Item = Snapshot>,
{
    let mut anchors: Vec<Snapshot> = Vec::new();
    let mut by_time: HashMap<i64, usize> = HashMap::new();

    for record in records {
        let Some(time) = record.epoch_seconds else {
            continue;
        };
        match by_time.get(&time) {
            Some(&index) => anchors[index].merge(record),
            None => {
                by_time.insert(time, anchors.len());
                anchors.push(record);
            }
        }
    }

    anchors.sort_by_key(|s| s.epoch_seconds);
    anchors
}
