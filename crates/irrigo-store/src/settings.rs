//! Controller configuration consulted by the log engine.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// Accessors the engine needs from the controller's persistent settings.
///
/// Implementations are expected to be cheap; the watering recorder reads
/// and writes the running counters on every completed run.
pub trait ControllerSettings {
    /// Number of configured zones. Zones are numbered from 1.
    fn number_of_zones(&self) -> u8;

    /// Flow rate of a zone in flow units per hour.
    fn zone_flow_rate(&self, zone: u8) -> u16;

    /// Running water counter of a weekday (0 = Sunday), in 1/100 flow-unit-minutes.
    fn weekday_water_counter(&self, weekday: usize) -> u32;

    fn set_weekday_water_counter(&mut self, weekday: usize, value: u32);

    /// Lifetime water counter in flow-unit-minutes.
    fn lifetime_water_counter(&self) -> u32;

    fn set_lifetime_water_counter(&mut self, value: u32);

    /// When the lifetime counter was last folded.
    fn water_counter_date(&self) -> Option<PrimitiveDateTime>;

    fn set_water_counter_date(&mut self, when: PrimitiveDateTime);
}

impl<T: ControllerSettings + ?Sized> ControllerSettings for &mut T {
    fn number_of_zones(&self) -> u8 {
        (**self).number_of_zones()
    }

    fn zone_flow_rate(&self, zone: u8) -> u16 {
        (**self).zone_flow_rate(zone)
    }

    fn weekday_water_counter(&self, weekday: usize) -> u32 {
        (**self).weekday_water_counter(weekday)
    }

    fn set_weekday_water_counter(&mut self, weekday: usize, value: u32) {
        (**self).set_weekday_water_counter(weekday, value)
    }

    fn lifetime_water_counter(&self) -> u32 {
        (**self).lifetime_water_counter()
    }

    fn set_lifetime_water_counter(&mut self, value: u32) {
        (**self).set_lifetime_water_counter(value)
    }

    fn water_counter_date(&self) -> Option<PrimitiveDateTime> {
        (**self).water_counter_date()
    }

    fn set_water_counter_date(&mut self, when: PrimitiveDateTime) {
        (**self).set_water_counter_date(when)
    }
}

/// Maximum number of zones a station can be configured with.
pub const MAX_ZONES: u8 = 8;

/// Serializable station settings.
///
/// This is the in-process settings store used by the CLI (persisted as the
/// `[station]` table of its TOML config) and by tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSettings {
    /// Number of zones.
    #[serde(default = "default_zones")]
    pub zones: u8,

    /// Flow rate per zone, zone 1 first. Missing entries read as 0.
    #[serde(default)]
    pub flow_rates: Vec<u16>,

    /// Running water counters, Sunday first.
    #[serde(default)]
    pub weekday_counters: [u32; 7],

    /// Lifetime water counter.
    #[serde(default)]
    pub lifetime_counter: u32,

    /// Last counter fold.
    #[serde(default)]
    pub counter_date: Option<PrimitiveDateTime>,
}

fn default_zones() -> u8 {
    MAX_ZONES
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            zones: default_zones(),
            flow_rates: Vec::new(),
            weekday_counters: [0; 7],
            lifetime_counter: 0,
            counter_date: None,
        }
    }
}

impl StationSettings {
    /// Settings with `zones` zones, all sharing one flow rate.
    pub fn with_uniform_flow(zones: u8, flow_rate: u16) -> Self {
        Self {
            zones,
            flow_rates: vec![flow_rate; usize::from(zones)],
            ..Self::default()
        }
    }
}

impl ControllerSettings for StationSettings {
    fn number_of_zones(&self) -> u8 {
        self.zones.min(MAX_ZONES)
    }

    fn zone_flow_rate(&self, zone: u8) -> u16 {
        usize::from(zone)
            .checked_sub(1)
            .and_then(|index| self.flow_rates.get(index))
            .copied()
            .unwrap_or(0)
    }

    fn weekday_water_counter(&self, weekday: usize) -> u32 {
        self.weekday_counters.get(weekday).copied().unwrap_or(0)
    }

    fn set_weekday_water_counter(&mut self, weekday: usize, value: u32) {
        if let Some(slot) = self.weekday_counters.get_mut(weekday) {
            *slot = value;
        }
    }

    fn lifetime_water_counter(&self) -> u32 {
        self.lifetime_counter
    }

    fn set_lifetime_water_counter(&mut self, value: u32) {
        self.lifetime_counter = value;
    }

    fn water_counter_date(&self) -> Option<PrimitiveDateTime> {
        self.counter_date
    }

    fn set_water_counter_date(&mut self, when: PrimitiveDateTime) {
        self.counter_date = Some(when);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_station() {
        let settings = StationSettings::default();
        assert_eq!(settings.number_of_zones(), 8);
        assert_eq!(settings.zone_flow_rate(1), 0);
        assert!(settings.water_counter_date().is_none());
    }

    #[test]
    fn test_zone_flow_rate_is_one_based() {
        let settings = StationSettings {
            flow_rates: vec![10, 20, 30],
            ..Default::default()
        };
        assert_eq!(settings.zone_flow_rate(0), 0);
        assert_eq!(settings.zone_flow_rate(1), 10);
        assert_eq!(settings.zone_flow_rate(3), 30);
        assert_eq!(settings.zone_flow_rate(4), 0);
    }

    #[test]
    fn test_zone_count_is_capped() {
        let settings = StationSettings {
            zones: 40,
            ..Default::default()
        };
        assert_eq!(settings.number_of_zones(), MAX_ZONES);
    }

    #[test]
    fn test_out_of_range_weekday_is_ignored() {
        let mut settings = StationSettings::default();
        settings.set_weekday_water_counter(9, 100);
        assert_eq!(settings.weekday_water_counter(9), 0);
        assert_eq!(settings.weekday_counters, [0; 7]);
    }

    #[test]
    fn test_settings_through_mut_ref() {
        fn bump(mut settings: impl ControllerSettings) -> u16 {
            settings.set_lifetime_water_counter(42);
            settings.zone_flow_rate(2)
        }

        let mut settings = StationSettings::with_uniform_flow(2, 12);
        assert_eq!(bump(&mut settings), 12);
        assert_eq!(settings.lifetime_counter, 42);
    }

    #[test]
    fn test_settings_json_defaults() {
        let settings: StationSettings = serde_json::from_str(r#"{"flow_rates":[5]}"#).unwrap();
        assert_eq!(settings.zones, MAX_ZONES);
        assert_eq!(settings.zone_flow_rate(1), 5);
    }
}
