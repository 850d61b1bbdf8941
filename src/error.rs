//! Error types for loading and normalizing statistics.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning a statistics file into charts.
///
/// None of these abort the process: the binary reports them and the affected
/// stage produces empty or partial output instead.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The input path does not exist.
    #[error("File not found at {}", .0.display())]
    FileNotFound(PathBuf),

    /// Reading or writing a file failed for a reason other than a missing path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No parseable JSON value was found anywhere in the input.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Fewer than two timestamped snapshots, so there is nothing to chart.
    #[error("Not enough data points to generate graphs ({found} timestamped snapshot(s), need 2)")]
    InsufficientData { found: usize },

    /// The settings file or environment held an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl StatsError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StatsError::FileNotFound(path)
        } else {
            StatsError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_io_errors_become_file_not_found() {
        let err = StatsError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, StatsError::FileNotFound(_)));
        assert_eq!(err.to_string(), "File not found at /tmp/missing.json");
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let err = StatsError::io(
            "/tmp/locked.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, StatsError::Io { .. }));
        assert!(err.to_string().contains("denied"));
    }
}
