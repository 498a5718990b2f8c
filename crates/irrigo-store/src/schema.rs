//! On-disk layout: category directories, partition file names and header rows.
//!
//! Everything in this module is part of the persistent format shared with
//! controllers already deployed in the field. Changing a name or a header
//! orphans existing data.

use std::path::{Path, PathBuf};

use irrigo_types::{LogCategory, SensorType};

/// Header row of every watering partition, including its terminator.
pub const WATERING_HEADER: &str =
    "Month,Day,Time,Run time(min),ScheduleID,Adjustment,WUAdjustment\r\n";

/// Directory of a log category under `root`.
pub fn category_dir(root: &Path, category: LogCategory) -> PathBuf {
    root.join(category.dir_name())
}

/// System log partition for a month: `logs/sys-MM-YYYY.log`.
pub fn system_log_path(root: &Path, month: u8, year: i32) -> PathBuf {
    category_dir(root, LogCategory::System).join(format!("sys-{month:02}-{year:04}.log"))
}

/// Watering partition for a year and zone: `watering.log/wat-YYYY-ZZ.log`.
pub fn watering_path(root: &Path, year: i32, zone: u8) -> PathBuf {
    category_dir(root, LogCategory::Watering).join(format!("wat-{year:04}-{zone:02}.log"))
}

/// Sensor partition: `<dir>/<prefix>-MM-YY-III.log`, with a two-digit year.
pub fn sensor_path(root: &Path, sensor: SensorType, month: u8, year: i32, sensor_id: u16) -> PathBuf {
    let yy = year.rem_euclid(100);
    category_dir(root, sensor.category()).join(format!(
        "{}-{month:02}-{yy:02}-{sensor_id:03}.log",
        sensor_prefix(sensor)
    ))
}

/// Header row of a sensor partition, including its terminator.
pub fn sensor_header(sensor: SensorType) -> String {
    format!("Day,Time,{}\n", sensor.unit_label())
}

fn sensor_prefix(sensor: SensorType) -> &'static str {
    match sensor {
        SensorType::Temperature => "tm",
        SensorType::Pressure => "pr",
        SensorType::Humidity => "hm",
        SensorType::Waterflow => "wf",
    }
}
