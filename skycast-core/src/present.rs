use chrono::{FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::WeatherRecord;

/// Countries whose locale gets a Fahrenheit suffix. This is the fixed
/// exception list, not a general unit rule; the displayed value itself is
/// whatever unit system the API was asked for.
const FAHRENHEIT_COUNTRIES: [&str; 3] = ["US", "LR", "MM"];

/// Temperature suffix for a locale country code.
pub fn unit_suffix(country_code: &str) -> &'static str {
    if FAHRENHEIT_COUNTRIES.contains(&country_code) {
        "°F"
    } else {
        "°C"
    }
}

/// Country part of the process locale, e.g. "en_US.UTF-8" -> "US".
///
/// Checked in the order the C library resolves locale categories.
pub fn locale_country() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
        .and_then(|tag| parse_locale_country(&tag))
}

fn parse_locale_country(tag: &str) -> Option<String> {
    let tag = tag.split('.').next()?;
    let country = tag.split(['_', '-']).nth(1)?;

    if country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(country.to_ascii_uppercase())
    } else {
        None
    }
}

/// Epoch seconds rendered as 24-hour `HH:mm` in the given timezone.
pub fn format_unix_time(epoch: i64, offset: FixedOffset) -> String {
    match Utc.timestamp_opt(epoch, 0) {
        chrono::LocalResult::Single(instant) => {
            instant.with_timezone(&offset).format("%H:%M").to_string()
        }
        _ => String::new(),
    }
}

/// Artwork chosen from the API condition code.
///
/// Variants are named after the bundled assets; codes outside the table
/// map to `Unknown` rather than silently rendering nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sun,
    SunnyCloudy,
    JustClouds,
    DarkClouds,
    Rainy,
    Stormy,
    Snowy,
    Fog,
    Moon,
    MoonCloud,
    RainyNight,
    Unknown,
}

impl WeatherIcon {
    pub fn from_code(icon_code: &str) -> Self {
        match icon_code {
            // day
            "01d" => Self::Sun,
            "02d" => Self::SunnyCloudy,
            "03d" => Self::JustClouds,
            "04d" => Self::DarkClouds,
            "10d" => Self::Rainy,
            "11d" => Self::Stormy,
            "13d" => Self::Snowy,
            "50d" => Self::Fog,
            // night
            "01n" => Self::Moon,
            "02n" => Self::MoonCloud,
            "03n" => Self::JustClouds,
            "04n" => Self::DarkClouds,
            "10n" => Self::RainyNight,
            "11n" => Self::Stormy,
            "13n" => Self::Snowy,
            "50n" => Self::Fog,
            _ => Self::Unknown,
        }
    }

    /// Asset name for the artwork.
    pub fn asset(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::SunnyCloudy => "sunny_cloudy",
            Self::JustClouds => "just_clouds",
            Self::DarkClouds => "dark_clouds",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
            Self::Snowy => "snowy",
            Self::Fog => "fog",
            Self::Moon => "moon",
            Self::MoonCloud => "moon_cloud",
            Self::RainyNight => "rainy_night",
            Self::Unknown => "unknown",
        }
    }
}

/// Display-ready fields for the weather screen.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub location_name: String,
    pub country: String,
    pub temperature: String,
    pub temp_min: String,
    pub temp_max: String,
    pub humidity: String,
    pub wind_speed: String,
    pub sunrise: String,
    pub sunset: String,
    pub condition_label: String,
    pub condition_description: String,
    pub icon: WeatherIcon,
}

/// Maps weather records into display strings.
///
/// Pure: the locale country and timezone offset are captured at
/// construction so rendering is deterministic and testable.
#[derive(Debug, Clone)]
pub struct Presenter {
    country_code: String,
    utc_offset: FixedOffset,
}

impl Presenter {
    pub fn new(country_code: impl Into<String>, utc_offset: FixedOffset) -> Self {
        Self {
            country_code: country_code.into(),
            utc_offset,
        }
    }

    pub fn render(&self, record: &WeatherRecord) -> WeatherView {
        let suffix = unit_suffix(&self.country_code);

        // Only the first condition entry reaches the screen.
        let (condition_label, condition_description, icon) = match record.primary_condition() {
            Some(condition) => (
                condition.main_label.clone(),
                condition.description.clone(),
                WeatherIcon::from_code(&condition.icon_code),
            ),
            None => (String::new(), String::new(), WeatherIcon::Unknown),
        };

        WeatherView {
            location_name: record.location_name.clone(),
            country: record.country_code.clone(),
            temperature: format!("{:.1}{suffix}", record.temperature),
            temp_min: format!("{:.1} min", record.temp_min),
            temp_max: format!("{:.1} max", record.temp_max),
            humidity: format!("{} per cent", record.humidity_percent),
            wind_speed: format!("{:.1}", record.wind_speed),
            sunrise: format_unix_time(record.sunrise_epoch, self.utc_offset),
            sunset: format_unix_time(record.sunset_epoch, self.utc_offset),
            condition_label,
            condition_description,
            icon,
        }
    }
}
