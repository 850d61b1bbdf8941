//! File-based statistics input.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::loader::{load, LoadedStats};
use crate::error::StatsError;

/// Read a statistics file and decode every snapshot it contains.
///
/// A missing path is reported as [`StatsError::FileNotFound`]; a file with no
/// decodable statistics object as [`StatsError::MalformedInput`].
pub fn load_file(path: &Path) -> Result<LoadedStats, StatsError> {
    let content = fs::read_to_string(path).map_err(|e| StatsError::io(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "read statistics file");
    load(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "name": "rdkafka#producer-1",
            "type": "producer",
            "ts": 1000,
            "time": 1700000000,
            "brokers": {
                "localhost:9092/0": { "state": "UP", "rxbytes": 10, "txbytes": 20 }
            },
            "topics": {}
        }"#
    }

    #[test]
    fn test_load_file_reads_snapshots() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        writeln!(file, "{}", sample_json().replace("1700000000", "1700000060")).unwrap();

        let loaded = load_file(file.path()).unwrap();
        assert_eq!(loaded.snapshots.len(), 2);
        assert!(loaded.snapshots[0].brokers.contains_key("localhost:9092/0"));
    }

    #[test]
    fn test_load_file_missing_file() {
        let result = load_file(Path::new("/nonexistent/path/stats.json"));
        assert!(matches!(result, Err(StatsError::FileNotFound(_))));
    }

    #[test]
    fn test_load_file_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_file(file.path());
        assert!(matches!(result, Err(StatsError::MalformedInput(_))));
    }
}
