//! Core types for irrigation controller logs.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::error::ParseError;

/// Category of log data.
///
/// Every category owns exactly one directory under the log root. The
/// directory names are part of the on-disk format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogCategory {
    /// System and diagnostic events.
    System,
    /// Completed watering runs.
    Watering,
    /// Temperature sensor readings.
    Temperature,
    /// Humidity sensor readings.
    Humidity,
    /// Atmospheric pressure sensor readings.
    Pressure,
    /// Waterflow counter readings.
    Waterflow,
}

impl LogCategory {
    /// All categories, in the order their directories are ensured at startup.
    pub const ALL: [LogCategory; 6] = [
        LogCategory::System,
        LogCategory::Watering,
        LogCategory::Waterflow,
        LogCategory::Temperature,
        LogCategory::Humidity,
        LogCategory::Pressure,
    ];

    /// Directory name relative to the log root.
    ///
    /// ```
    /// use irrigo_types::LogCategory;
    ///
    /// assert_eq!(LogCategory::Watering.dir_name(), "watering.log");
    /// assert_eq!(LogCategory::System.dir_name(), "logs");
    /// ```
    #[must_use]
    pub fn dir_name(&self) -> &'static str {
        match self {
            LogCategory::System => "logs",
            LogCategory::Watering => "watering.log",
            LogCategory::Temperature => "tempr.log",
            LogCategory::Humidity => "humid.log",
            LogCategory::Pressure => "pressure.log",
            LogCategory::Waterflow => "wflow.log",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogCategory::System => write!(f, "System"),
            LogCategory::Watering => write!(f, "Watering"),
            LogCategory::Temperature => write!(f, "Temperature"),
            LogCategory::Humidity => write!(f, "Humidity"),
            LogCategory::Pressure => write!(f, "Pressure"),
            LogCategory::Waterflow => write!(f, "Waterflow"),
        }
    }
}

/// Kind of sensor feeding the sensor logs.
///
/// Producers (local polling, remote stations) hand over raw `u8` codes;
/// use [`TryFrom<u8>`] to validate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum SensorType {
    /// Temperature in degrees Fahrenheit.
    Temperature = 1,
    /// Atmospheric pressure.
    Pressure = 2,
    /// Relative humidity.
    Humidity = 3,
    /// Waterflow counter.
    Waterflow = 4,
}

impl SensorType {
    /// The log category (and therefore directory) this sensor writes into.
    #[must_use]
    pub fn category(&self) -> LogCategory {
        match self {
            SensorType::Temperature => LogCategory::Temperature,
            SensorType::Pressure => LogCategory::Pressure,
            SensorType::Humidity => LogCategory::Humidity,
            SensorType::Waterflow => LogCategory::Waterflow,
        }
    }

    /// Unit label written into the third column of a partition header.
    ///
    /// ```
    /// use irrigo_types::SensorType;
    ///
    /// assert_eq!(SensorType::Temperature.unit_label(), "Temperature(F)");
    /// assert_eq!(SensorType::Pressure.unit_label(), "AirPressure");
    /// ```
    #[must_use]
    pub fn unit_label(&self) -> &'static str {
        match self {
            SensorType::Temperature => "Temperature(F)",
            SensorType::Pressure => "AirPressure",
            SensorType::Humidity => "Humidity",
            SensorType::Waterflow => "Waterflow",
        }
    }

    /// Human readable name used for chart series.
    #[must_use]
    pub fn series_name(&self) -> &'static str {
        match self {
            SensorType::Temperature => "Temperature",
            SensorType::Pressure => "Air Pressure",
            SensorType::Humidity => "Humidity",
            SensorType::Waterflow => "Waterflow",
        }
    }
}

impl TryFrom<u8> for SensorType {
    type Error = ParseError;

    /// Convert a raw sensor type code.
    ///
    /// ```
    /// use irrigo_types::SensorType;
    ///
    /// assert_eq!(SensorType::try_from(1), Ok(SensorType::Temperature));
    /// assert!(SensorType::try_from(0).is_err());
    /// ```
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SensorType::Temperature),
            2 => Ok(SensorType::Pressure),
            3 => Ok(SensorType::Humidity),
            4 => Ok(SensorType::Waterflow),
            _ => Err(ParseError::UnknownSensorType(value)),
        }
    }
}

impl FromStr for SensorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "temperature" | "temp" => Ok(SensorType::Temperature),
            "pressure" => Ok(SensorType::Pressure),
            "humidity" => Ok(SensorType::Humidity),
            "waterflow" | "flow" => Ok(SensorType::Waterflow),
            other => Err(ParseError::InvalidData(format!(
                "unknown sensor type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.series_name())
    }
}

/// Severity of a system event.
///
/// Codes follow syslog numbering and are written verbatim into the system
/// log, so the discriminants are part of the on-disk format.
///
/// # Ordering
///
/// More severe events compare lower: `Crit < Error < Warning < Notice < Info < Verbose`.
///
/// ```
/// use irrigo_types::Severity;
///
/// assert!(Severity::Crit < Severity::Warning);
/// assert_eq!(Severity::Verbose.routed(), Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Severity {
    /// Critical condition.
    Crit = 2,
    /// Error condition.
    Error = 3,
    /// Warning.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational.
    Info = 6,
    /// Verbose diagnostics. Routed downstream as [`Severity::Info`].
    Verbose = 7,
}

impl Severity {
    /// Numeric code as stored in the system log.
    #[must_use]
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Severity used for downstream routing (trace prefix, notifier).
    #[must_use]
    pub fn routed(&self) -> Severity {
        match self {
            Severity::Verbose => Severity::Info,
            other => *other,
        }
    }

    /// Short upper-case label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Crit => "CRIT",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Verbose => "VERBOSE",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, ParseError> {
        match value {
            2 => Ok(Severity::Crit),
            3 => Ok(Severity::Error),
            4 => Ok(Severity::Warning),
            5 => Ok(Severity::Notice),
            6 => Ok(Severity::Info),
            7 => Ok(Severity::Verbose),
            _ => Err(ParseError::UnknownSeverity(value)),
        }
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crit" | "critical" => Ok(Severity::Crit),
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "notice" => Ok(Severity::Notice),
            "info" => Ok(Severity::Info),
            "verbose" => Ok(Severity::Verbose),
            other => Err(ParseError::InvalidData(format!("unknown severity '{other}'"))),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Binning granularity for chart-style watering queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Grouping {
    /// 24 bins keyed by hour of day.
    Hourly,
    /// 7 bins keyed by weekday, Sunday first.
    Daily,
    /// 12 bins keyed by month, January first.
    Monthly,
    /// Free-width numeric bins over the query range. Reserved; never supported.
    Numeric,
}

impl Grouping {
    /// Number of bins, or `None` for groupings that cannot be computed.
    ///
    /// ```
    /// use irrigo_types::Grouping;
    ///
    /// assert_eq!(Grouping::Hourly.bins(), Some(24));
    /// assert_eq!(Grouping::Numeric.bins(), None);
    /// ```
    #[must_use]
    pub fn bins(&self) -> Option<usize> {
        match self {
            Grouping::Hourly => Some(24),
            Grouping::Daily => Some(7),
            Grouping::Monthly => Some(12),
            Grouping::Numeric => None,
        }
    }
}

impl FromStr for Grouping {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" | "hour" => Ok(Grouping::Hourly),
            "daily" | "day" => Ok(Grouping::Daily),
            "monthly" | "month" => Ok(Grouping::Monthly),
            "numeric" | "none" => Ok(Grouping::Numeric),
            other => Err(ParseError::InvalidData(format!("unknown grouping '{other}'"))),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::Hourly => write!(f, "hourly"),
            Grouping::Daily => write!(f, "daily"),
            Grouping::Monthly => write!(f, "monthly"),
            Grouping::Numeric => write!(f, "numeric"),
        }
    }
}

/// Time bucket used when summarizing a sensor series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Summary {
    /// No summarization; every reading is emitted as-is.
    #[default]
    Raw,
    /// Average per clock hour.
    Hour,
    /// Average per calendar day.
    Day,
    /// Average per calendar month.
    Month,
}

impl FromStr for Summary {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(Summary::Raw),
            "hour" | "hourly" => Ok(Summary::Hour),
            "day" | "daily" => Ok(Summary::Day),
            "month" | "monthly" => Ok(Summary::Month),
            other => Err(ParseError::InvalidData(format!("unknown summary '{other}'"))),
        }
    }
}

/// One completed watering run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WateringRecord {
    /// When the run started (controller local time, minute resolution on disk).
    pub start: PrimitiveDateTime,
    /// Zone number, starting at 1.
    pub zone: u8,
    /// Run time in minutes.
    pub duration: u16,
    /// Schedule that triggered the run.
    pub schedule: u16,
    /// Seasonal adjustment in percent.
    pub seasonal_adjustment: i32,
    /// Weather service adjustment in percent.
    pub weather_adjustment: i32,
}

/// One sensor reading, placed in its partition's year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorRecord {
    /// When the reading was logged (minute resolution).
    pub timestamp: PrimitiveDateTime,
    /// Raw reading.
    pub reading: i32,
}

/// A system event chunk handed to the external notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SystemEvent {
    /// Event severity as originally recorded.
    pub severity: Severity,
    /// Controller local time in seconds since the epoch.
    pub timestamp: i64,
    /// True when more chunks of the same event follow.
    pub continuation: bool,
    /// Chunk payload.
    pub payload: String,
}
