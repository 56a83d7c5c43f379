use crate::error::{PipelineError, Result};
use crate::utils::constants::{
    EXTRACTION_SUBDIR, FIRE_FAMILY_DIR, OUTPUT_PREFIX, STATION_FAMILY_DIR,
};
use chrono::{Datelike, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Pipeline settings, loaded once at startup and passed into each stage.
///
/// All filesystem paths used by the pipeline are joined against `raw_dir`
/// and `processed_dir`; nothing else reads configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root for downloaded archives and their extraction trees
    pub raw_dir: PathBuf,
    /// Root for consolidated per-year output
    pub processed_dir: PathBuf,
    /// Listing page that links to the station archives
    pub listing_url: String,
    /// First calendar year considered for consolidation
    pub start_year: u16,
    /// Last calendar year considered for consolidation (inclusive)
    pub end_year: u16,
}

impl Settings {
    /// Load settings from a TOML file plus `PIPELINE_*` environment
    /// overrides. Missing or malformed configuration is fatal.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => File::from(path.to_path_buf()),
            None => File::with_name("pipeline"),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("PIPELINE"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            return Err(PipelineError::Config(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )));
        }
        if i32::from(self.end_year) > Utc::now().year() {
            warn!(
                end_year = self.end_year,
                "configured range extends past the current year; those years will stay empty"
            );
        }
        Ok(())
    }

    /// Inclusive range of years the coordinator enumerates
    pub fn years(&self) -> impl Iterator<Item = u16> {
        self.start_year..=self.end_year
    }

    pub fn station_archive_dir(&self) -> PathBuf {
        self.raw_dir.join(STATION_FAMILY_DIR)
    }

    pub fn station_extraction_dir(&self) -> PathBuf {
        self.station_archive_dir().join(EXTRACTION_SUBDIR)
    }

    pub fn fire_archive_dir(&self) -> PathBuf {
        self.raw_dir.join(FIRE_FAMILY_DIR)
    }

    pub fn fire_extraction_dir(&self) -> PathBuf {
        self.fire_archive_dir().join(EXTRACTION_SUBDIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.processed_dir.join(STATION_FAMILY_DIR)
    }

    /// Path of the consolidated artifact for one year
    pub fn output_path(&self, year: u16) -> PathBuf {
        self.output_dir()
            .join(format!("{}_{}.csv", OUTPUT_PREFIX, year))
    }
}
