//! Partitioned log storage for irrigation controllers.
//!
//! This crate persists watering runs, sensor readings and system events to
//! append-only text files partitioned by time (and zone or sensor), and
//! rebuilds chart and table views from them by streaming the files.
//!
//! # Features
//!
//! - One directory per log category, created on demand
//! - Watering runs with per-weekday and lifetime water counters
//! - Sensor readings for temperature, pressure, humidity and water flow
//! - System events traced and forwarded to a notifier in bounded chunks
//! - Binned, tabular and summarized-series queries emitting JSON
//!
//! # Example
//!
//! ```no_run
//! use irrigo_store::{LogStore, Logger, NullNotifier, StationSettings};
//! use irrigo_types::{Grouping, Severity};
//! use time::macros::date;
//!
//! let mut logger = Logger::new(
//!     LogStore::open_default(),
//!     StationSettings::with_uniform_flow(4, 120),
//!     NullNotifier,
//! );
//! logger.begin()?;
//! logger.record_system_event(Severity::Notice, "Controller started")?;
//! logger.record_sensor(1, 1, 72)?;
//!
//! let mut out = Vec::new();
//! logger.query_binned(&mut out, date!(2024-05-01), date!(2024-05-31), Grouping::Hourly)?;
//! # Ok::<(), irrigo_store::Error>(())
//! ```

mod aggregate;
mod clock;
mod counter;
mod error;
mod events;
mod models;
mod notifier;
mod queries;
mod schema;
mod sensors;
mod settings;
mod store;
mod watering;

pub use aggregate::{BinAccumulator, MAX_BINS, SeriesAggregator, SeriesPoint, ZoneBins};
pub use clock::{Clock, ManualClock, SystemClock, epoch_seconds};
pub use counter::RunningWaterCounter;
pub use error::{Error, Result};
pub use events::{Chunks, DEFAULT_EVENT_CHUNK_SIZE, DEFAULT_MAX_EVENT_PAYLOAD, EventStaging};
pub use notifier::{EventNotifier, NullNotifier};
pub use queries::{QueryEngine, QueryRange, SensorScan, WateringScan};
pub use schema::{
    WATERING_HEADER, category_dir, sensor_header, sensor_path, system_log_path, watering_path,
};
pub use settings::{ControllerSettings, MAX_ZONES, StationSettings};
pub use store::{LogStore, Logger};

/// Default log root following platform conventions.
///
/// - Linux: `~/.local/share/irrigo`
/// - macOS: `~/Library/Application Support/irrigo`
/// - Windows: `C:\Users\<user>\AppData\Local\irrigo`
pub fn default_log_root() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("irrigo")
}
