//! Error types for data parsing in irrigo-types.

use thiserror::Error;

/// Errors that can occur when decoding controller codes or log records.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Generic invalid input.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Raw sensor type code has no known sensor kind.
    #[error("Unknown sensor type: {0}")]
    UnknownSensorType(u8),

    /// Raw severity code is outside the CRIT..VERBOSE range.
    #[error("Unknown severity code: {0}")]
    UnknownSeverity(u8),

    /// A partition line did not match its record schema.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// Result type alias using irrigo-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
