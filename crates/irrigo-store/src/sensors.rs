//! Sensor reading recording.

use tracing::{debug, warn};

use irrigo_types::SensorType;

use crate::error::{Error, Result};
use crate::models::SensorLine;
use crate::notifier::EventNotifier;
use crate::schema;
use crate::settings::ControllerSettings;
use crate::store::Logger;

impl<S: ControllerSettings, N: EventNotifier> Logger<S, N> {
    /// Record a reading for a raw sensor type code.
    ///
    /// Unknown codes fail with [`Error::UnsupportedSensorType`] and touch
    /// nothing on disk.
    pub fn record_sensor(&mut self, sensor_type: u8, sensor_id: u16, reading: i32) -> Result<()> {
        let Ok(sensor) = SensorType::try_from(sensor_type) else {
            warn!("Unsupported sensor type {} (sensor {})", sensor_type, sensor_id);
            return Err(Error::UnsupportedSensorType(sensor_type));
        };
        self.record_sensor_reading(sensor, sensor_id, reading)
    }

    /// Record a reading, timestamped with the current time, in the sensor's
    /// partition for the current month.
    pub fn record_sensor_reading(
        &mut self,
        sensor: SensorType,
        sensor_id: u16,
        reading: i32,
    ) -> Result<()> {
        if !self.store.is_ready() {
            return Err(Error::StoreNotReady);
        }

        let now = self.now();
        let path = schema::sensor_path(
            self.store.root(),
            sensor,
            u8::from(now.month()),
            now.year(),
            sensor_id,
        );
        let header = schema::sensor_header(sensor);
        let mut file = self.store.append_partition(&path, Some(&header))?;
        SensorLine::new(now, reading).write_to(&mut file)?;

        debug!("Logged {} sensor {}: {}", sensor, sensor_id, reading);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notifier::NullNotifier;
    use crate::settings::StationSettings;
    use crate::store::LogStore;
    use time::macros::datetime;

    fn logger(root: &std::path::Path) -> Logger<StationSettings> {
        Logger::new(LogStore::new(root), StationSettings::default(), NullNotifier)
            .with_clock(ManualClock::new(datetime!(2024-11-02 13:45)))
    }

    #[test]
    fn test_record_sensor_writes_header_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());
        logger.begin().unwrap();

        logger.record_sensor(1, 7, 68).unwrap();
        logger.record_sensor(1, 7, -3).unwrap();

        let text = std::fs::read_to_string(dir.path().join("tempr.log/tm-11-24-007.log")).unwrap();
        assert_eq!(text, "Day,Time,Temperature(F)\n2,13:45,68\n2,13:45,-3\n");
    }

    #[test]
    fn test_each_type_has_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());
        logger.begin().unwrap();

        logger.record_sensor(2, 1, 1013).unwrap();
        logger.record_sensor(3, 1, 55).unwrap();
        logger.record_sensor(4, 1, 12).unwrap();

        assert!(dir.path().join("pressure.log/pr-11-24-001.log").is_file());
        assert!(dir.path().join("humid.log/hm-11-24-001.log").is_file());
        assert!(dir.path().join("wflow.log/wf-11-24-001.log").is_file());
    }

    #[test]
    fn test_unknown_type_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());
        logger.begin().unwrap();

        let err = logger.record_sensor(9, 1, 5).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSensorType(9)));
        for category in irrigo_types::LogCategory::ALL {
            let dir = dir.path().join(category.dir_name());
            assert_eq!(std::fs::read_dir(dir).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_not_ready_rejects_reading() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());

        let err = logger.record_sensor(3, 1, 40).unwrap_err();
        assert!(matches!(err, Error::StoreNotReady));
    }
}
