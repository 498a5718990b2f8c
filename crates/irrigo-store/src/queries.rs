//! Range queries over the partitioned logs.
//!
//! Three views are supported, all streamed straight from the partition
//! files with constant memory:
//!
//! - binned watering means per zone ([`QueryEngine::write_binned`])
//! - a table of every matching watering run ([`QueryEngine::write_table`])
//! - a summarized sensor series ([`QueryEngine::write_sensor_series`])
//!
//! # Example
//!
//! ```no_run
//! use irrigo_store::{QueryEngine, QueryRange};
//! use irrigo_types::Grouping;
//! use time::macros::date;
//!
//! let engine = QueryEngine::new("/var/lib/irrigo", 8);
//! let range = QueryRange::new(date!(2024-05-01), date!(2024-05-31));
//!
//! let mut out = Vec::new();
//! engine.write_binned(&mut out, &range, Grouping::Hourly)?;
//! # Ok::<(), irrigo_store::Error>(())
//! ```

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use serde::Serialize;
use time::{Date, Month};
use tracing::{debug, trace, warn};

use irrigo_types::{Grouping, SensorRecord, SensorType, Summary, WateringRecord};

use crate::aggregate::{SeriesAggregator, SeriesPoint, ZoneBins};
use crate::clock::epoch_seconds;
use crate::error::{Error, Result};
use crate::models::{SensorLine, WateringLine};
use crate::notifier::EventNotifier;
use crate::schema;
use crate::settings::ControllerSettings;
use crate::store::{Logger, open_partition};

/// An inclusive date range confined to one calendar year.
///
/// The end is extended by one day. If that crosses into another year the
/// end is clipped to December 31 of the start year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    start: Date,
    end: Date,
    truncated: bool,
}

impl QueryRange {
    pub fn new(start: Date, end: Date) -> Self {
        let end = start.max(end);
        let end = end.next_day().unwrap_or(end);

        if end.year() == start.year() {
            return Self {
                start,
                end,
                truncated: false,
            };
        }

        let year_end = Date::from_calendar_date(start.year(), Month::December, 31).unwrap_or(end);
        debug!(
            "Query range {} to {} spans years, truncated to {}",
            start, end, year_end
        );
        Self {
            start,
            end: year_end,
            truncated: true,
        }
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn start(&self) -> Date {
        self.start
    }

    /// Last included date.
    pub fn end(&self) -> Date {
        self.end
    }

    /// True when the range was clipped to the end of the start year.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Months touched by the range, in order.
    pub fn months(&self) -> impl Iterator<Item = u8> {
        u8::from(self.start.month())..=u8::from(self.end.month())
    }

    fn has_started(&self, month: u8, day: u8) -> bool {
        (month, day) >= (u8::from(self.start.month()), self.start.day())
    }

    fn is_past_end(&self, month: u8, day: u8) -> bool {
        (month, day) > (u8::from(self.end.month()), self.end.day())
    }
}

fn partition_rows(file: File) -> StringRecordsIntoIter<File> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(file)
        .into_records()
}

/// Next parseable row, or `None` at end of file or on a read failure.
fn next_row(rows: &mut StringRecordsIntoIter<File>, path: &Path) -> Option<csv::StringRecord> {
    loop {
        match rows.next()? {
            Ok(row) => return Some(row),
            Err(e) if e.is_io_error() => {
                warn!("Read error in {}: {}", path.display(), e);
                return None;
            }
            Err(e) => trace!("Skipping unreadable line in {}: {}", path.display(), e),
        }
    }
}

/// Matching watering runs of one zone partition, in file order.
pub struct WateringScan {
    rows: StringRecordsIntoIter<File>,
    path: PathBuf,
    zone: u8,
    range: QueryRange,
    done: bool,
}

impl Iterator for WateringScan {
    type Item = WateringRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(row) = next_row(&mut self.rows, &self.path) else {
                self.done = true;
                break;
            };
            let line = match WateringLine::parse(&row) {
                Ok(line) => line,
                Err(e) => {
                    trace!("Skipping line in {}: {}", self.path.display(), e);
                    continue;
                }
            };
            if self.range.is_past_end(line.month, line.day) {
                self.done = true;
                break;
            }
            if !self.range.has_started(line.month, line.day) {
                continue;
            }
            match line.into_record(self.range.year(), self.zone) {
                Ok(record) => return Some(record),
                Err(e) => trace!("Skipping line in {}: {}", self.path.display(), e),
            }
        }
        None
    }
}

/// Matching readings of one sensor partition, in file order.
pub struct SensorScan {
    rows: StringRecordsIntoIter<File>,
    path: PathBuf,
    year: i32,
    month: u8,
    range: QueryRange,
    done: bool,
}

impl Iterator for SensorScan {
    type Item = SensorRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(row) = next_row(&mut self.rows, &self.path) else {
                self.done = true;
                break;
            };
            let line = match SensorLine::parse(&row) {
                Ok(line) => line,
                Err(e) => {
                    trace!("Skipping line in {}: {}", self.path.display(), e);
                    continue;
                }
            };
            if self.range.is_past_end(self.month, line.day) {
                self.done = true;
                break;
            }
            if !self.range.has_started(self.month, line.day) {
                continue;
            }
            match line.into_record(self.year, self.month) {
                Ok(record) => return Some(record),
                Err(e) => trace!("Skipping line in {}: {}", self.path.display(), e),
            }
        }
        None
    }
}

#[derive(Serialize)]
struct TableEntry {
    date: i64,
    duration: u16,
    schedule: u16,
    seasonal: i32,
    wunderground: i32,
}

impl From<&WateringRecord> for TableEntry {
    fn from(record: &WateringRecord) -> Self {
        Self {
            date: epoch_seconds(record.start),
            duration: record.duration,
            schedule: record.schedule,
            seasonal: record.seasonal_adjustment,
            wunderground: record.weather_adjustment,
        }
    }
}

/// Read-only queries over a log tree.
///
/// Queries do not depend on the store being ready; they read whatever
/// partitions exist. Missing partitions contribute nothing.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    root: PathBuf,
    zones: u8,
}

impl QueryEngine {
    pub fn new<P: Into<PathBuf>>(root: P, zones: u8) -> Self {
        Self {
            root: root.into(),
            zones,
        }
    }

    pub fn zones(&self) -> u8 {
        self.zones
    }

    /// Stream the runs of `zone` within `range`. `None` when the zone has no
    /// partition for the range's year.
    pub fn scan_zone(&self, zone: u8, range: &QueryRange) -> Option<WateringScan> {
        let path = schema::watering_path(&self.root, range.year(), zone);
        let file = open_partition(&path)?;
        Some(WateringScan {
            rows: partition_rows(file),
            path,
            zone,
            range: *range,
            done: false,
        })
    }

    /// Stream the readings of one sensor partition.
    pub fn scan_sensor(
        &self,
        sensor: SensorType,
        sensor_id: u16,
        month: u8,
        range: &QueryRange,
    ) -> Option<SensorScan> {
        let year = range.year();
        let path = schema::sensor_path(&self.root, sensor, month, year, sensor_id);
        let file = open_partition(&path)?;
        Some(SensorScan {
            rows: partition_rows(file),
            path,
            year,
            month,
            range: *range,
            done: false,
        })
    }

    /// Bin the runs of one zone. `Ok(None)` when nothing matched.
    pub fn zone_bins(
        &self,
        zone: u8,
        range: &QueryRange,
        grouping: Grouping,
    ) -> Result<Option<ZoneBins>> {
        let mut bins = ZoneBins::new(zone, grouping)?;
        let Some(scan) = self.scan_zone(zone, range) else {
            return Ok(None);
        };
        for record in scan {
            bins.add(&record);
        }
        Ok((bins.matched() > 0).then_some(bins))
    }

    /// Write `{"<zone>": [[bin, mean], ...], ...}` for every zone with at
    /// least one matching run.
    pub fn write_binned<W: Write + ?Sized>(
        &self,
        out: &mut W,
        range: &QueryRange,
        grouping: Grouping,
    ) -> Result<()> {
        if grouping.bins().is_none() {
            return Err(Error::UnsupportedGrouping(grouping));
        }

        out.write_all(b"{")?;
        let mut first = true;
        for zone in 1..=self.zones {
            let Some(bins) = self.zone_bins(zone, range, grouping)? else {
                continue;
            };
            if !first {
                out.write_all(b",")?;
            }
            first = false;

            write!(out, "\"{zone}\":[")?;
            for (index, (bin, mean)) in bins.bins().enumerate() {
                if index > 0 {
                    out.write_all(b",")?;
                }
                write!(out, "[{bin},{mean}]")?;
            }
            out.write_all(b"]")?;
        }
        out.write_all(b"}")?;
        Ok(())
    }

    /// Write `[{"zone": z, "entries": [...]}, ...]` listing every matching
    /// run, grouped by zone in file order.
    pub fn write_table<W: Write + ?Sized>(
        &self,
        out: &mut W,
        range: &QueryRange,
    ) -> Result<()> {
        out.write_all(b"[")?;
        let mut first_zone = true;
        for zone in 1..=self.zones {
            let Some(scan) = self.scan_zone(zone, range) else {
                continue;
            };

            let mut entries = 0usize;
            for record in scan {
                if entries == 0 {
                    if !first_zone {
                        out.write_all(b",")?;
                    }
                    first_zone = false;
                    write!(out, "{{\"zone\":{zone},\"entries\":[")?;
                } else {
                    out.write_all(b",")?;
                }
                serde_json::to_writer(&mut *out, &TableEntry::from(&record))?;
                entries += 1;
            }
            if entries > 0 {
                out.write_all(b"]}")?;
                debug!("Zone {}: {} watering entries", zone, entries);
            }
        }
        out.write_all(b"]")?;
        Ok(())
    }

    /// Feed every emitted series point to `f`, partition by partition.
    ///
    /// Summarizing state is reset at each partition boundary. Returns the
    /// number of points emitted.
    pub fn for_each_series_point<F>(
        &self,
        sensor: SensorType,
        sensor_id: u16,
        range: &QueryRange,
        summary: Summary,
        mut f: F,
    ) -> Result<usize>
    where
        F: FnMut(SeriesPoint) -> Result<()>,
    {
        let mut emitted = 0;
        for month in range.months() {
            let Some(scan) = self.scan_sensor(sensor, sensor_id, month, range) else {
                continue;
            };
            let mut aggregator = SeriesAggregator::new(summary);
            for record in scan {
                if let Some(point) = aggregator.push(&record) {
                    f(point)?;
                    emitted += 1;
                }
            }
        }
        Ok(emitted)
    }

    /// Write `{"series": [{"name": ..., "data": [[ms, value], ...]}]}`.
    /// The series array is empty when no point was emitted.
    pub fn write_sensor_series<W: Write + ?Sized>(
        &self,
        out: &mut W,
        sensor: SensorType,
        sensor_id: u16,
        range: &QueryRange,
        summary: Summary,
    ) -> Result<()> {
        let name = format!("{} readings, Sensor: {}", sensor.series_name(), sensor_id);

        out.write_all(b"{\"series\":[")?;
        let mut first = true;
        let emitted = self.for_each_series_point(sensor, sensor_id, range, summary, |point| {
            if first {
                out.write_all(b"{\"name\":")?;
                serde_json::to_writer(&mut *out, &name)?;
                out.write_all(b",\"data\":[")?;
                first = false;
            } else {
                out.write_all(b",")?;
            }
            write!(out, "[{},{}]", point.epoch_millis(), point.value)?;
            Ok(())
        })?;
        if emitted > 0 {
            out.write_all(b"]}")?;
        }
        out.write_all(b"]}")?;
        Ok(())
    }
}

impl<S: ControllerSettings, N: EventNotifier> Logger<S, N> {
    /// Binned watering means. See [`QueryEngine::write_binned`].
    pub fn query_binned<W: Write + ?Sized>(
        &self,
        out: &mut W,
        start: Date,
        end: Date,
        grouping: Grouping,
    ) -> Result<()> {
        self.queries()
            .write_binned(out, &QueryRange::new(start, end), grouping)
    }

    /// Watering table. See [`QueryEngine::write_table`].
    pub fn query_table<W: Write + ?Sized>(
        &self,
        out: &mut W,
        start: Date,
        end: Date,
    ) -> Result<()> {
        self.queries().write_table(out, &QueryRange::new(start, end))
    }

    /// Sensor series. See [`QueryEngine::write_sensor_series`].
    pub fn query_sensor_series<W: Write + ?Sized>(
        &self,
        out: &mut W,
        sensor: SensorType,
        sensor_id: u16,
        start: Date,
        end: Date,
        summary: Summary,
    ) -> Result<()> {
        self.queries().write_sensor_series(
            out,
            sensor,
            sensor_id,
            &QueryRange::new(start, end),
            summary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_range_extends_end_by_one_day() {
        let range = QueryRange::new(date!(2024-05-01), date!(2024-05-10));
        assert_eq!(range.end(), date!(2024-05-11));
        assert!(!range.is_truncated());
        assert!(range.has_started(5, 1));
        assert!(!range.has_started(4, 30));
        assert!(!range.is_past_end(5, 11));
        assert!(range.is_past_end(5, 12));
    }

    #[test]
    fn test_range_spanning_years_is_truncated() {
        let range = QueryRange::new(date!(2023-12-20), date!(2024-01-10));
        assert_eq!(range.end(), date!(2023-12-31));
        assert_eq!(range.year(), 2023);
        assert!(range.is_truncated());
    }

    #[test]
    fn test_range_ending_on_new_years_eve_is_truncated() {
        let range = QueryRange::new(date!(2023-06-01), date!(2023-12-31));
        assert_eq!(range.end(), date!(2023-12-31));
        assert!(range.is_truncated());
    }

    #[test]
    fn test_reversed_range_collapses_to_start() {
        let range = QueryRange::new(date!(2024-03-10), date!(2024-03-01));
        assert_eq!(range.start(), date!(2024-03-10));
        assert_eq!(range.end(), date!(2024-03-11));
    }

    #[test]
    fn test_range_months() {
        let range = QueryRange::new(date!(2024-02-15), date!(2024-04-02));
        assert_eq!(range.months().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_binned_rejects_numeric_before_output() {
        let engine = QueryEngine::new("/nonexistent", 8);
        let range = QueryRange::new(date!(2024-01-01), date!(2024-01-31));
        let mut out = Vec::new();

        let err = engine.write_binned(&mut out, &range, Grouping::Numeric).unwrap_err();
        assert!(matches!(err, Error::UnsupportedGrouping(Grouping::Numeric)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_tree_produces_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let engine = QueryEngine::new(dir.path(), 4);
        let range = QueryRange::new(date!(2024-01-01), date!(2024-01-31));

        let mut out = Vec::new();
        engine.write_binned(&mut out, &range, Grouping::Daily).unwrap();
        assert_eq!(out, b"{}");

        let mut out = Vec::new();
        engine.write_table(&mut out, &range).unwrap();
        assert_eq!(out, b"[]");

        let mut out = Vec::new();
        engine
            .write_sensor_series(&mut out, SensorType::Humidity, 1, &range, Summary::Day)
            .unwrap();
        assert_eq!(out, br#"{"series":[]}"#);
    }
}
