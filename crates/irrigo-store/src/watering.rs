//! Watering run recording and the running water counters.

use tracing::debug;

use irrigo_types::WateringRecord;

use crate::counter::RunningWaterCounter;
use crate::error::{Error, Result};
use crate::models::WateringLine;
use crate::notifier::EventNotifier;
use crate::schema;
use crate::settings::ControllerSettings;
use crate::store::Logger;

impl<S: ControllerSettings, N: EventNotifier> Logger<S, N> {
    /// Record a completed watering run.
    ///
    /// The run's water use is added to the running counters first, whether
    /// or not the line can be written. The line goes to the partition of
    /// the run's start year and zone, created with a header if missing.
    pub fn record_watering(&mut self, record: &WateringRecord) -> Result<()> {
        let now = self.now();
        let flow_rate = self.settings.zone_flow_rate(record.zone);
        let contribution = RunningWaterCounter::contribution(record.duration, flow_rate);

        let mut counter = RunningWaterCounter::load(&self.settings);
        if counter.apply(now, contribution) {
            debug!(
                "Water counter rolled over on {}, lifetime total {}",
                now.date(),
                counter.lifetime
            );
        }
        counter.save(&mut self.settings);

        if !self.store.is_ready() {
            return Err(Error::StoreNotReady);
        }

        let path = schema::watering_path(self.store.root(), record.start.year(), record.zone);
        let mut file = self
            .store
            .append_partition(&path, Some(schema::WATERING_HEADER))?;
        WateringLine::from_record(record).write_to(&mut file)?;

        debug!(
            "Logged watering zone {} for {} min at {}",
            record.zone, record.duration, record.start
        );
        Ok(())
    }

    /// Snapshot of the running water counters.
    pub fn water_counters(&self) -> RunningWaterCounter {
        RunningWaterCounter::load(&self.settings)
    }
}
