//! Command implementations for the CLI.

mod query;
mod record;
mod station;

use std::path::{Path, PathBuf};

use irrigo_store::{EventNotifier, LogStore, Logger, ManualClock, StationSettings};
use irrigo_types::SystemEvent;
use time::PrimitiveDateTime;

use crate::config::Config;

pub use query::{cmd_graph, cmd_series, cmd_table};
pub use record::{WateringArgs, cmd_event, cmd_init, cmd_sensor, cmd_watering};
pub use station::{cmd_config, cmd_counters};

/// State shared by every command.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub log_root: PathBuf,
    pub now: Option<PrimitiveDateTime>,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    /// Build an engine over the configured log root. The station settings
    /// are moved into it; hand them back with [`Context::absorb`].
    pub fn logger(&self) -> Logger<StationSettings, TraceNotifier> {
        let logger = Logger::new(
            LogStore::new(&self.log_root),
            self.config.station.clone(),
            TraceNotifier,
        )
        .with_event_limits(self.config.max_event_payload, self.config.event_chunk_size);

        match self.now {
            Some(now) => logger.with_clock(ManualClock::new(now)),
            None => logger,
        }
    }

    /// Take back the station settings from a finished engine and persist them.
    pub fn absorb(&mut self, logger: Logger<StationSettings, TraceNotifier>) -> anyhow::Result<()> {
        let (_, station, _) = logger.into_parts();
        self.config.station = station;
        self.config.save_to(&self.config_path)
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Notifier that traces each delivered chunk. The CLI has no master station
/// to forward events to.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceNotifier;

impl EventNotifier for TraceNotifier {
    fn deliver_system_event(&mut self, event: &SystemEvent) {
        tracing::debug!(
            severity = %event.severity,
            timestamp = event.timestamp,
            continuation = event.continuation,
            "Notifier chunk: {}",
            event.payload
        );
    }
}
