use serde::{Deserialize, Serialize};

/// A single resolved location sample.
///
/// Produced once per fetch cycle by the location acquirer and consumed
/// immediately by the weather client; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One weather condition entry as reported by the API.
///
/// `icon_code` is a short day/night variant string such as "01d" or "10n".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main_label: String,
    pub description: String,
    pub icon_code: String,
}

/// The last successful weather observation, replaced wholesale on every fetch.
///
/// `conditions` is non-empty when present; the API always returns at least
/// one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_name: String,
    pub country_code: String,
    pub conditions: Vec<Condition>,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_percent: u8,
    pub wind_speed: f64,
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
}

impl WeatherRecord {
    /// The condition entry the screen shows. Only the first entry is
    /// rendered even when the API returns several.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}
