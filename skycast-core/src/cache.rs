use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::project_dirs;
use crate::model::WeatherRecord;

const CACHE_FILE_NAME: &str = "last_report.json";

/// Stores the most recent successful weather record as one JSON file.
///
/// `save` always overwrites; `load` returns `None` when nothing has been
/// written yet or when the stored payload cannot be parsed. There is no
/// TTL and no versioning: the record is replaced wholesale on every
/// successful fetch.
#[derive(Debug, Clone)]
pub struct LastReportCache {
    path: PathBuf,
}

impl LastReportCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Cache file under the platform cache directory.
    pub fn at_default_location() -> Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self::new(dirs.cache_dir().join(CACHE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last stored record. Missing, empty, or malformed content
    /// all read as "nothing cached"; malformed content additionally logs.
    pub fn load(&self) -> Option<WeatherRecord> {
        if !self.path.exists() {
            return None;
        }

        let payload = match fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read weather cache");
                return None;
            }
        };

        if payload.is_empty() {
            return None;
        }

        match serde_json::from_str(&payload) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "discarding malformed weather cache");
                None
            }
        }
    }

    /// Overwrite the stored record with `record`.
    pub fn save(&self, record: &WeatherRecord) -> Result<()> {
        let payload = serde_json::to_vec(record).context("Failed to serialize weather record")?;
        self.write_atomic(&payload)
            .with_context(|| format!("Failed to write weather cache: {}", self.path.display()))
    }

    // Write-then-rename so a reader never observes a half-written record.
    fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "cache path must have a parent directory",
            )
        })?;
        fs::create_dir_all(parent)?;

        let tmp_path = self.path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
