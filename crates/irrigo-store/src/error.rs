//! Error types for irrigo-store.

use std::path::PathBuf;

use irrigo_types::Grouping;

/// Result type for irrigo-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in irrigo-store.
///
/// None of these are fatal to the host: a failed write means the record or
/// event is lost, nothing more.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store is not ready (directory setup failed, or it was closed).
    #[error("Log store is not ready")]
    StoreNotReady,

    /// Failed to create a log category directory.
    #[error("Failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A partition file could neither be opened nor created.
    #[error("Failed to open log file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Sensor type code not recognized.
    #[error("Unsupported sensor type: {0}")]
    UnsupportedSensorType(u8),

    /// Grouping mode has no implementation.
    #[error("Unsupported grouping: {0}")]
    UnsupportedGrouping(Grouping),

    /// Serialization error while writing query output.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
