//! Controller settings record
//!
//! Watering, misting, lighting and climate thresholds for the terrarium
//! controller. Stored as one byte per field followed by the NUL-terminated
//! `":)"` marker.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Marker identifying a stored settings block
///
/// The trailing NUL keeps an ordinary pair of field values (58, 41) from
/// reading as a marker.
pub const SETTINGS_MARKER: &[u8; 3] = b":)\0";

/// Number of data fields in [`Settings`]
pub const FIELD_COUNT: usize = 15;

/// Stored size of [`Settings`] (fields + marker)
pub const SETTINGS_SIZE: usize = FIELD_COUNT + SETTINGS_MARKER.len();

/// Controller settings
///
/// Periods are in minutes, time-of-day bounds in hours (0-23).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Watering interval during the day
    pub watering_day_period: u8,
    /// Watering interval at night
    pub watering_night_period: u8,
    /// Watering interval around sunrise
    pub watering_sunrise_period: u8,
    /// Misting interval during the day
    pub misting_day_period: u8,
    /// Misting interval at night
    pub misting_night_period: u8,
    /// Misting interval around sunrise
    pub misting_sunrise_period: u8,
    /// Start of daytime (hour)
    pub daytime_from: u8,
    /// End of daytime (hour)
    pub daytime_to: u8,
    /// Start of nighttime (hour)
    pub nighttime_from: u8,
    /// End of nighttime (hour)
    pub nighttime_to: u8,
    /// Ambient light level below which the lamp may switch on
    pub light_threshold: u8,
    /// Target length of the lit day (hours)
    pub light_day_duration: u8,
    /// Relative humidity threshold (%)
    pub humid_threshold: u8,
    /// Air temperature threshold (°C)
    pub temp_threshold: u8,
    /// Substrate temperature threshold (°C)
    pub temp_subs_threshold: u8,
}

impl Settings {
    /// Compiled-in defaults
    pub const DEFAULT: Self = Self {
        watering_day_period: 60,
        watering_night_period: 180,
        watering_sunrise_period: 90,
        misting_day_period: 30,
        misting_night_period: 90,
        misting_sunrise_period: 60,
        daytime_from: 13,
        daytime_to: 16,
        nighttime_from: 21,
        nighttime_to: 4,
        light_threshold: 200,
        light_day_duration: 14,
        humid_threshold: 40,
        temp_threshold: 20,
        temp_subs_threshold: 20,
    };

    /// Read a field
    pub fn get(&self, field: SettingsField) -> u8 {
        match field {
            SettingsField::WateringDayPeriod => self.watering_day_period,
            SettingsField::WateringNightPeriod => self.watering_night_period,
            SettingsField::WateringSunrisePeriod => self.watering_sunrise_period,
            SettingsField::MistingDayPeriod => self.misting_day_period,
            SettingsField::MistingNightPeriod => self.misting_night_period,
            SettingsField::MistingSunrisePeriod => self.misting_sunrise_period,
            SettingsField::DaytimeFrom => self.daytime_from,
            SettingsField::DaytimeTo => self.daytime_to,
            SettingsField::NighttimeFrom => self.nighttime_from,
            SettingsField::NighttimeTo => self.nighttime_to,
            SettingsField::LightThreshold => self.light_threshold,
            SettingsField::LightDayDuration => self.light_day_duration,
            SettingsField::HumidThreshold => self.humid_threshold,
            SettingsField::TempThreshold => self.temp_threshold,
            SettingsField::TempSubsThreshold => self.temp_subs_threshold,
        }
    }

    /// Write a field
    pub fn set(&mut self, field: SettingsField, value: u8) {
        let slot = match field {
            SettingsField::WateringDayPeriod => &mut self.watering_day_period,
            SettingsField::WateringNightPeriod => &mut self.watering_night_period,
            SettingsField::WateringSunrisePeriod => &mut self.watering_sunrise_period,
            SettingsField::MistingDayPeriod => &mut self.misting_day_period,
            SettingsField::MistingNightPeriod => &mut self.misting_night_period,
            SettingsField::MistingSunrisePeriod => &mut self.misting_sunrise_period,
            SettingsField::DaytimeFrom => &mut self.daytime_from,
            SettingsField::DaytimeTo => &mut self.daytime_to,
            SettingsField::NighttimeFrom => &mut self.nighttime_from,
            SettingsField::NighttimeTo => &mut self.nighttime_to,
            SettingsField::LightThreshold => &mut self.light_threshold,
            SettingsField::LightDayDuration => &mut self.light_day_duration,
            SettingsField::HumidThreshold => &mut self.humid_threshold,
            SettingsField::TempThreshold => &mut self.temp_threshold,
            SettingsField::TempSubsThreshold => &mut self.temp_subs_threshold,
        };
        *slot = value;
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Record for Settings {
    type Bytes = [u8; SETTINGS_SIZE];

    const MARKER: &'static [u8] = SETTINGS_MARKER;

    fn to_bytes(&self) -> Self::Bytes {
        let mut bytes = [0u8; SETTINGS_SIZE];
        for field in SettingsField::ALL {
            bytes[field.offset()] = self.get(field);
        }
        bytes[FIELD_COUNT..].copy_from_slice(SETTINGS_MARKER);
        bytes
    }

    fn from_bytes(bytes: &Self::Bytes) -> Self {
        let mut settings = Self::DEFAULT;
        for field in SettingsField::ALL {
            settings.set(field, bytes[field.offset()]);
        }
        settings
    }
}

/// Settings field identifier, in stored order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum SettingsField {
    WateringDayPeriod = 0,
    WateringNightPeriod = 1,
    WateringSunrisePeriod = 2,
    MistingDayPeriod = 3,
    MistingNightPeriod = 4,
    MistingSunrisePeriod = 5,
    DaytimeFrom = 6,
    DaytimeTo = 7,
    NighttimeFrom = 8,
    NighttimeTo = 9,
    LightThreshold = 10,
    LightDayDuration = 11,
    HumidThreshold = 12,
    TempThreshold = 13,
    TempSubsThreshold = 14,
}

impl SettingsField {
    /// All fields in stored order
    pub const ALL: [SettingsField; FIELD_COUNT] = [
        SettingsField::WateringDayPeriod,
        SettingsField::WateringNightPeriod,
        SettingsField::WateringSunrisePeriod,
        SettingsField::MistingDayPeriod,
        SettingsField::MistingNightPeriod,
        SettingsField::MistingSunrisePeriod,
        SettingsField::DaytimeFrom,
        SettingsField::DaytimeTo,
        SettingsField::NighttimeFrom,
        SettingsField::NighttimeTo,
        SettingsField::LightThreshold,
        SettingsField::LightDayDuration,
        SettingsField::HumidThreshold,
        SettingsField::TempThreshold,
        SettingsField::TempSubsThreshold,
    ];

    /// Byte offset of this field in the stored block
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// Look up a field by its stored index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}
