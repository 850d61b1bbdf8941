//! Statistics input: the snapshot model and the loader.
//!
//! This module turns raw statistics text into an ordered sequence of
//! [`Snapshot`]s with at most one snapshot per second.
//!
//! ## Pipeline
//!
//! ```text
//! raw text
//!    │  decode: one document, an array, or concatenated documents
//!    ▼
//! Vec<Snapshot> (raw, sorted by time then ts)
//!    │  deduplicate: merge fragments sharing `time` into the first one
//!    ▼
//! LoadedStats::snapshots
//! ```

mod file;
mod lenient;
mod loader;
mod snapshot;

pub use file::load_file;
pub use loader::{deduplicate, load, sort_snapshots, LoadedStats};
pub use snapshot::{
    is_sentinel, BrokerObservation, BrokerState, ClientRole, PartitionObservation, Snapshot,
    TopicObservation, NOT_ASSIGNED, UNSET_OFFSET,
};
