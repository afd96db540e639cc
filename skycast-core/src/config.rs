use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::Coordinate;

/// Default OpenWeather endpoint; overridable for test doubles.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data";

/// Default geolocation endpoint used by the IP-based fix source.
pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Unit system sent to the weather API.
pub const METRIC_UNIT: &str = "metric";

/// Where the one-shot location fix comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSourceKind {
    /// Network-based lookup against the geolocation endpoint.
    #[default]
    Ip,
    /// A fixed coordinate from the config file.
    Manual,
    /// Location is turned off entirely.
    Off,
}

/// Location acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub source: LocationSourceKind,

    /// Standing answer to the permission prompt. `None` asks every run.
    pub allow: Option<bool>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub geolocation_url: String,

    /// Seconds to wait for a fix. `None` waits indefinitely.
    pub fix_timeout_secs: Option<u64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            source: LocationSourceKind::default(),
            allow: None,
            latitude: None,
            longitude: None,
            geolocation_url: default_geolocation_url(),
            fix_timeout_secs: None,
        }
    }
}

impl LocationConfig {
    /// The manual coordinate, when both parts are configured.
    pub fn manual_coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn fix_timeout(&self) -> Option<Duration> {
        self.fix_timeout_secs.map(Duration::from_secs)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_units")]
    pub units: String,

    /// Seconds before the weather request gives up. `None` waits
    /// indefinitely.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    #[serde(default)]
    pub location: LocationConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_geolocation_url() -> String {
    DEFAULT_GEOLOCATION_URL.to_string()
}

fn default_units() -> String {
    METRIC_UNIT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            units: default_units(),
            http_timeout_secs: None,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Returns the API key, with a hint when it has not been configured yet.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `skycast configure` and enter your OpenWeather API key."
                )
            })
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// Load config from disk, or return defaults if the file doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub(crate) fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub(crate) fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_unset() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `skycast configure`"));
    }

    #[test]
    fn require_api_key_errors_when_empty() {
        let cfg = Config {
            api_key: Some(String::new()),
            ..Config::default()
        };
        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn defaults_point_at_openweather_with_metric_units() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.units, METRIC_UNIT);
        assert_eq!(cfg.http_timeout(), None);
        assert_eq!(cfg.location.source, LocationSourceKind::Ip);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str("api_key = \"KEY\"").expect("parse");
        assert_eq!(cfg.require_api_key().expect("key"), "KEY");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.location.geolocation_url, DEFAULT_GEOLOCATION_URL);
        assert_eq!(cfg.location.fix_timeout(), None);
    }

    #[test]
    fn manual_coordinate_requires_both_parts() {
        let mut location = LocationConfig::default();
        assert!(location.manual_coordinate().is_none());

        location.latitude = Some(37.7749);
        assert!(location.manual_coordinate().is_none());

        location.longitude = Some(-122.4194);
        let coordinate = location.manual_coordinate().expect("coordinate");
        assert_eq!(coordinate.latitude, 37.7749);
        assert_eq!(coordinate.longitude, -122.4194);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.api_key = Some("KEY".to_string());
        cfg.location.source = LocationSourceKind::Manual;
        cfg.location.latitude = Some(48.85);
        cfg.location.longitude = Some(2.35);
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.location.source, LocationSourceKind::Manual);
        assert!(loaded.location.manual_coordinate().is_some());
    }

    #[test]
    fn load_of_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert!(cfg.api_key.is_none());
    }
}
