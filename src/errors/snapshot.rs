//! Error types for writing the leaderboard snapshot.

use std::path::PathBuf;

/// Errors that can occur while persisting a snapshot.
///
/// Any of these leaves the previous artifact (if any) untouched: the writer
/// only replaces the target after the full document is on disk.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot could not be serialized to JSON.
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while writing or publishing the snapshot.
    #[error("Snapshot I/O error at {path}: {details}")]
    Io {
        path: PathBuf,
        details: String,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    pub fn io(path: impl Into<PathBuf>, details: impl Into<String>, source: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.into(),
            details: details.into(),
            source,
        }
    }
}
