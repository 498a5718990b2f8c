//! Platform-agnostic types for irrigation controller logs.
//!
//! This crate provides the shared vocabulary used by the log engine
//! (irrigo-store) and its hosts: log categories, sensor kinds, event
//! severities, query groupings and the records that flow through the
//! partitioned log files.
//!
//! # Example
//!
//! ```
//! use irrigo_types::{Grouping, SensorType, Severity};
//!
//! let sensor = SensorType::try_from(3).unwrap();
//! assert_eq!(sensor, SensorType::Humidity);
//! assert_eq!(Grouping::Daily.bins(), Some(7));
//! assert_eq!(Severity::Warning.code(), 4);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Grouping, LogCategory, SensorRecord, SensorType, Severity, Summary, SystemEvent,
    WateringRecord,
};
