//! Line schemas for the partition files.
//!
//! Each partition line is a fixed list of typed fields separated by `,`,
//! with clock times written as `H:Min`. Numbers are written without
//! padding. Parsing is the exact inverse of formatting; any missing or
//! non-numeric field makes the whole line malformed.

use std::io::{self, Write};
use std::str::FromStr;

use csv::StringRecord;
use time::{Date, Month, PrimitiveDateTime, Time};

use irrigo_types::{ParseError, ParseResult, SensorRecord, Severity, WateringRecord};

/// One line of a watering partition. The year and zone live in the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WateringLine {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub duration: u16,
    pub schedule: u16,
    pub seasonal_adjustment: i32,
    pub weather_adjustment: i32,
}

impl WateringLine {
    pub fn from_record(record: &WateringRecord) -> Self {
        Self {
            month: u8::from(record.start.month()),
            day: record.start.day(),
            hour: record.start.hour(),
            minute: record.start.minute(),
            duration: record.duration,
            schedule: record.schedule,
            seasonal_adjustment: record.seasonal_adjustment,
            weather_adjustment: record.weather_adjustment,
        }
    }

    /// Write the line with the `\r\n` terminator watering partitions use.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(
            out,
            "{},{},{}:{},{},{},{},{}\r\n",
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.duration,
            self.schedule,
            self.seasonal_adjustment,
            self.weather_adjustment
        )
    }

    pub fn parse(row: &StringRecord) -> ParseResult<Self> {
        let (hour, minute) = clock_field(row, 2)?;
        Ok(Self {
            month: field(row, 0, "month")?,
            day: field(row, 1, "day")?,
            hour,
            minute,
            duration: field(row, 3, "duration")?,
            schedule: field(row, 4, "schedule")?,
            seasonal_adjustment: field(row, 5, "seasonal adjustment")?,
            weather_adjustment: field(row, 6, "weather adjustment")?,
        })
    }

    /// Rebuild the full record using the partition's year and zone.
    pub fn into_record(self, year: i32, zone: u8) -> ParseResult<WateringRecord> {
        Ok(WateringRecord {
            start: timestamp(year, self.month, self.day, self.hour, self.minute)?,
            zone,
            duration: self.duration,
            schedule: self.schedule,
            seasonal_adjustment: self.seasonal_adjustment,
            weather_adjustment: self.weather_adjustment,
        })
    }
}

/// One line of a sensor partition. Year and month live in the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SensorLine {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub reading: i32,
}

impl SensorLine {
    pub fn new(at: PrimitiveDateTime, reading: i32) -> Self {
        Self {
            day: at.day(),
            hour: at.hour(),
            minute: at.minute(),
            reading,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{},{}:{},{}", self.day, self.hour, self.minute, self.reading)
    }

    pub fn parse(row: &StringRecord) -> ParseResult<Self> {
        let (hour, minute) = clock_field(row, 1)?;
        Ok(Self {
            day: field(row, 0, "day")?,
            hour,
            minute,
            reading: field(row, 2, "reading")?,
        })
    }

    pub fn into_record(self, year: i32, month: u8) -> ParseResult<SensorRecord> {
        Ok(SensorRecord {
            timestamp: timestamp(year, month, self.day, self.hour, self.minute)?,
            reading: self.reading,
        })
    }
}

/// Leading columns of a system log line: `D,H:Min:Sec,code,`.
pub(crate) fn system_line_prefix(at: PrimitiveDateTime, severity: Severity) -> String {
    format!(
        "{},{}:{}:{},{},",
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
        severity.code()
    )
}

fn field<T: FromStr>(row: &StringRecord, index: usize, name: &str) -> ParseResult<T> {
    row.get(index)
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| ParseError::MalformedRecord(format!("bad {name} in column {index}")))
}

fn clock_field(row: &StringRecord, index: usize) -> ParseResult<(u8, u8)> {
    let malformed = || ParseError::MalformedRecord(format!("bad time in column {index}"));
    let (hour, minute) = row
        .get(index)
        .and_then(|raw| raw.trim().split_once(':'))
        .ok_or_else(malformed)?;
    let hour = hour.trim().parse().map_err(|_| malformed())?;
    let minute = minute.trim().parse().map_err(|_| malformed())?;
    Ok((hour, minute))
}

fn timestamp(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> ParseResult<PrimitiveDateTime> {
    let invalid = |e: time::error::ComponentRange| ParseError::MalformedRecord(e.to_string());
    let month = Month::try_from(month).map_err(invalid)?;
    let date = Date::from_calendar_date(year, month, day).map_err(invalid)?;
    let time = Time::from_hms(hour, minute, 0).map_err(invalid)?;
    Ok(PrimitiveDateTime::new(date, time))
}
