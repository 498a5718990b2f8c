//! Fixed-size aggregation for watering bins and sensor series summaries.

use time::{Duration, PrimitiveDateTime, Time};

use irrigo_types::{Grouping, SensorRecord, Summary, WateringRecord};

use crate::clock::epoch_seconds;
use crate::error::{Error, Result};

/// Largest number of bins any grouping uses.
pub const MAX_BINS: usize = 24;

/// Running sum and count of one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinAccumulator {
    sum: i64,
    count: u32,
}

impl BinAccumulator {
    pub fn add(&mut self, value: i64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Integer mean, truncating toward zero. 0 when empty.
    pub fn mean(&self) -> i64 {
        if self.count == 0 {
            0
        } else {
            self.sum / i64::from(self.count)
        }
    }
}

/// Bin index of a watering run under a grouping.
///
/// These indices are the charting contract: hour 0..=23, weekday 0..=6
/// counted from Sunday, and month 0..=11 counted from January.
fn bin_index(grouping: Grouping, start: PrimitiveDateTime) -> Option<usize> {
    match grouping {
        Grouping::Hourly => Some(usize::from(start.hour())),
        Grouping::Daily => Some(usize::from(start.weekday().number_days_from_sunday())),
        Grouping::Monthly => Some(usize::from(u8::from(start.month())) - 1),
        Grouping::Numeric => None,
    }
}

/// Mean watering duration per bin for one zone.
#[derive(Debug, Clone)]
pub struct ZoneBins {
    zone: u8,
    grouping: Grouping,
    slots: [BinAccumulator; MAX_BINS],
    len: usize,
    matched: usize,
}

impl ZoneBins {
    /// Empty bins for `zone`. Fails for groupings without a bin layout.
    pub fn new(zone: u8, grouping: Grouping) -> Result<Self> {
        let len = grouping.bins().ok_or(Error::UnsupportedGrouping(grouping))?;
        Ok(Self {
            zone,
            grouping,
            slots: [BinAccumulator::default(); MAX_BINS],
            len,
            matched: 0,
        })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn add(&mut self, record: &WateringRecord) {
        if let Some(slot) = bin_index(self.grouping, record.start)
            .filter(|index| *index < self.len)
            .and_then(|index| self.slots.get_mut(index))
        {
            slot.add(i64::from(record.duration));
            self.matched += 1;
        }
    }

    /// Number of records added.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Non-empty bins in index order as `(bin, mean)`.
    pub fn bins(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.slots[..self.len]
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_empty())
            .map(|(index, slot)| (index, slot.mean()))
    }
}

/// One emitted point of a sensor series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    pub timestamp: PrimitiveDateTime,
    pub value: i32,
}

impl SeriesPoint {
    /// Timestamp as epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        epoch_seconds(self.timestamp) * 1000
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenBucket {
    anchor: PrimitiveDateTime,
    sum: i64,
    count: u32,
}

/// Streaming run-length summarizer for one partition file.
///
/// Consecutive readings sharing a bucket are averaged; the average is
/// emitted when a reading from a different bucket arrives. The last open
/// bucket is never emitted. With [`Summary::Raw`] every reading is emitted
/// as it arrives.
#[derive(Debug, Clone)]
pub struct SeriesAggregator {
    summary: Summary,
    open: Option<OpenBucket>,
}

impl SeriesAggregator {
    pub fn new(summary: Summary) -> Self {
        Self {
            summary,
            open: None,
        }
    }

    pub fn push(&mut self, record: &SensorRecord) -> Option<SeriesPoint> {
        let Some(anchor) = bucket_anchor(self.summary, record.timestamp) else {
            return Some(SeriesPoint {
                timestamp: record.timestamp,
                value: record.reading,
            });
        };

        if let Some(open) = self.open.as_mut().filter(|open| open.anchor == anchor) {
            open.sum += i64::from(record.reading);
            open.count += 1;
            return None;
        }

        let closed = self.open.replace(OpenBucket {
            anchor,
            sum: i64::from(record.reading),
            count: 1,
        });
        // the mean of i32 readings always fits in an i32
        closed.map(|bucket| SeriesPoint {
            timestamp: bucket.anchor,
            value: (bucket.sum / i64::from(bucket.count)) as i32,
        })
    }
}

fn bucket_anchor(summary: Summary, at: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
    let midnight = at.date().midnight();
    match summary {
        Summary::Raw => None,
        Summary::Hour => Some(midnight + Duration::hours(i64::from(at.hour()))),
        Summary::Day => Some(midnight),
        Summary::Month => Some(
            (at.date() - Duration::days(i64::from(at.day()) - 1)).with_time(Time::MIDNIGHT),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn run(start: PrimitiveDateTime, duration: u16) -> WateringRecord {
        WateringRecord {
            start,
            zone: 1,
            duration,
            schedule: 0,
            seasonal_adjustment: 100,
            weather_adjustment: 100,
        }
    }

    fn reading(timestamp: PrimitiveDateTime, reading: i32) -> SensorRecord {
        SensorRecord { timestamp, reading }
    }

    #[test]
    fn test_empty_bin_mean_is_zero() {
        assert_eq!(BinAccumulator::default().mean(), 0);
    }

    #[test]
    fn test_mean_truncates() {
        let mut bin = BinAccumulator::default();
        bin.add(10);
        bin.add(11);
        assert_eq!(bin.mean(), 10);
        assert_eq!(bin.count(), 2);
    }

    #[test]
    fn test_hourly_bins() {
        let mut bins = ZoneBins::new(1, Grouping::Hourly).unwrap();
        bins.add(&run(datetime!(2024-04-01 5:10), 10));
        bins.add(&run(datetime!(2024-04-02 5:40), 20));
        bins.add(&run(datetime!(2024-04-02 6:00), 9));

        assert_eq!(bins.bins().collect::<Vec<_>>(), vec![(5, 15), (6, 9)]);
        assert_eq!(bins.matched(), 3);
    }

    #[test]
    fn test_daily_bins_cover_saturday() {
        let mut bins = ZoneBins::new(1, Grouping::Daily).unwrap();
        // Sunday and Saturday
        bins.add(&run(datetime!(2024-05-05 6:00), 12));
        bins.add(&run(datetime!(2024-05-11 6:00), 8));
        assert_eq!(bins.bins().collect::<Vec<_>>(), vec![(0, 12), (6, 8)]);
    }

    #[test]
    fn test_monthly_bins_cover_december() {
        let mut bins = ZoneBins::new(1, Grouping::Monthly).unwrap();
        bins.add(&run(datetime!(2024-01-15 6:00), 4));
        bins.add(&run(datetime!(2024-12-15 6:00), 6));
        assert_eq!(bins.bins().collect::<Vec<_>>(), vec![(0, 4), (11, 6)]);
    }

    #[test]
    fn test_numeric_grouping_unsupported() {
        let err = ZoneBins::new(1, Grouping::Numeric).unwrap_err();
        assert!(matches!(err, Error::UnsupportedGrouping(Grouping::Numeric)));
    }

    #[test]
    fn test_raw_series_emits_every_reading() {
        let mut agg = SeriesAggregator::new(Summary::Raw);
        let point = agg.push(&reading(datetime!(2024-06-01 10:05), 70)).unwrap();
        assert_eq!(point.timestamp, datetime!(2024-06-01 10:05));
        assert_eq!(point.value, 70);
    }

    #[test]
    fn test_hour_series_emits_on_key_change_only() {
        let mut agg = SeriesAggregator::new(Summary::Hour);
        assert!(agg.push(&reading(datetime!(2024-06-01 10:05), 70)).is_none());
        assert!(agg.push(&reading(datetime!(2024-06-01 10:35), 75)).is_none());

        let point = agg.push(&reading(datetime!(2024-06-01 11:05), 80)).unwrap();
        assert_eq!(point.timestamp, datetime!(2024-06-01 10:00));
        assert_eq!(point.value, 72);
    }

    #[test]
    fn test_month_bucket_anchors_on_first_day() {
        let mut agg = SeriesAggregator::new(Summary::Month);
        agg.push(&reading(datetime!(2024-02-20 8:00), 10));
        let point = agg.push(&reading(datetime!(2024-03-02 8:00), 20)).unwrap();
        assert_eq!(point.timestamp, datetime!(2024-02-01 0:00));
        assert_eq!(point.value, 10);
    }

    #[test]
    fn test_day_bucket_negative_mean() {
        let mut agg = SeriesAggregator::new(Summary::Day);
        agg.push(&reading(datetime!(2024-01-01 1:00), -3));
        agg.push(&reading(datetime!(2024-01-01 2:00), -4));
        let point = agg.push(&reading(datetime!(2024-01-02 0:00), 0)).unwrap();
        assert_eq!(point.value, -3);
        assert_eq!(point.epoch_millis(), 1_704_067_200_000);
    }
}
