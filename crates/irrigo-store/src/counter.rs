//! Running water-use counters.
//!
//! Water use is accumulated per weekday in 1/100 flow-unit-minutes. The
//! first run on a new calendar day folds the current weekday's bucket into
//! the lifetime total (in whole flow-unit-minutes) and restarts the bucket
//! with that run's contribution.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::settings::ControllerSettings;

/// Snapshot of the running counters held by the settings provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningWaterCounter {
    /// Per-weekday buckets, Sunday first.
    pub weekday: [u32; 7],
    /// Lifetime total.
    pub lifetime: u32,
    /// Time of the last fold.
    pub updated_at: Option<PrimitiveDateTime>,
}

impl RunningWaterCounter {
    /// Contribution of a run: `duration * flow_rate / 60`, truncated.
    pub fn contribution(duration_minutes: u16, flow_rate: u16) -> u32 {
        u32::from(duration_minutes) * u32::from(flow_rate) / 60
    }

    pub fn load<S: ControllerSettings + ?Sized>(settings: &S) -> Self {
        let mut weekday = [0; 7];
        for (index, slot) in weekday.iter_mut().enumerate() {
            *slot = settings.weekday_water_counter(index);
        }
        Self {
            weekday,
            lifetime: settings.lifetime_water_counter(),
            updated_at: settings.water_counter_date(),
        }
    }

    pub fn save<S: ControllerSettings + ?Sized>(&self, settings: &mut S) {
        for (index, value) in self.weekday.iter().enumerate() {
            settings.set_weekday_water_counter(index, *value);
        }
        settings.set_lifetime_water_counter(self.lifetime);
        if let Some(at) = self.updated_at {
            settings.set_water_counter_date(at);
        }
    }

    /// Add a contribution at `now`. Returns true when a day rollover fold happened.
    ///
    /// The fold happens at most once per calendar day: only when the date of
    /// `now` differs from the date of the last fold.
    pub fn apply(&mut self, now: PrimitiveDateTime, contribution: u32) -> bool {
        let dow = usize::from(now.weekday().number_days_from_sunday());
        let same_day = self
            .updated_at
            .is_some_and(|last| last.date() == now.date());

        if same_day {
            self.weekday[dow] = self.weekday[dow].saturating_add(contribution);
            false
        } else {
            self.lifetime = self.lifetime.saturating_add(self.weekday[dow] / 100);
            self.updated_at = Some(now);
            self.weekday[dow] = contribution;
            true
        }
    }

    /// Sum of all weekday buckets, in 1/100 flow-unit-minutes.
    pub fn week_total(&self) -> u64 {
        self.weekday.iter().map(|v| u64::from(*v)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StationSettings;
    use time::macros::datetime;

    #[test]
    fn test_contribution_truncates() {
        assert_eq!(RunningWaterCounter::contribution(60, 10), 10);
        assert_eq!(RunningWaterCounter::contribution(30, 10), 5);
        assert_eq!(RunningWaterCounter::contribution(5, 10), 0);
    }

    #[test]
    fn test_same_day_accumulates() {
        // 2024-05-06 is a Monday
        let mut counter = RunningWaterCounter::default();
        assert!(counter.apply(datetime!(2024-05-06 6:00), 10));
        assert!(!counter.apply(datetime!(2024-05-06 18:00), 5));
        assert_eq!(counter.weekday[1], 15);
        assert_eq!(counter.lifetime, 0);
    }

    #[test]
    fn test_new_day_folds_current_weekday_bucket() {
        let mut counter = RunningWaterCounter {
            weekday: [0, 0, 1234, 0, 0, 0, 0],
            lifetime: 7,
            updated_at: Some(datetime!(2024-05-06 6:00)),
        };

        // Tuesday: bucket 2 folds 1234 / 100 = 12 and restarts
        assert!(counter.apply(datetime!(2024-05-07 6:00), 40));
        assert_eq!(counter.lifetime, 19);
        assert_eq!(counter.weekday[2], 40);
        assert_eq!(counter.updated_at, Some(datetime!(2024-05-07 6:00)));

        // second run that day does not fold again
        assert!(!counter.apply(datetime!(2024-05-07 7:00), 40));
        assert_eq!(counter.lifetime, 19);
        assert_eq!(counter.weekday[2], 80);
    }

    #[test]
    fn test_same_weekday_next_week_is_a_new_day() {
        let mut counter = RunningWaterCounter::default();
        counter.apply(datetime!(2024-05-06 6:00), 500);
        assert!(counter.apply(datetime!(2024-05-13 6:00), 20));
        assert_eq!(counter.lifetime, 5);
        assert_eq!(counter.weekday[1], 20);
    }

    #[test]
    fn test_bucket_saturates() {
        let mut counter = RunningWaterCounter::default();
        counter.apply(datetime!(2024-05-06 6:00), u32::MAX - 1);
        counter.apply(datetime!(2024-05-06 7:00), 10);
        assert_eq!(counter.weekday[1], u32::MAX);
    }

    #[test]
    fn test_load_and_save_round_trip_through_settings() {
        let mut settings = StationSettings::default();
        let mut counter = RunningWaterCounter::load(&settings);
        counter.apply(datetime!(2024-05-11 9:30), 250);
        counter.save(&mut settings);

        assert_eq!(settings.weekday_counters[6], 250);
        assert_eq!(settings.counter_date, Some(datetime!(2024-05-11 9:30)));
        assert_eq!(RunningWaterCounter::load(&settings), counter);
        assert_eq!(counter.week_total(), 250);
    }
}
