use crate::archive::{ArchiveExtractor, ArchiveFetcher, ExtractionSummary, FetchSummary};
use crate::error::Result;
use crate::processors::{Consolidator, YearOutcome};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionReport {
    pub fetched: FetchSummary,
    pub stations: ExtractionSummary,
    pub fires: ExtractionSummary,
}

/// Sequences the pipeline stages.
///
/// Acquisition always runs download → station extraction → fire-record
/// extraction. Consolidation takes an explicit set of years; deciding that
/// set (and any interactive confirmation) belongs to the caller.
///
/// Idempotency rests on filesystem existence checks with no locking, so
/// concurrent invocations against the same data roots are unsafe.
pub struct Coordinator {
    settings: Settings,
}

impl Coordinator {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn run_acquisition(&self) -> Result<AcquisitionReport> {
        let fetcher = ArchiveFetcher::new(
            &self.settings.listing_url,
            self.settings.station_archive_dir(),
        )?;
        let fetched = fetcher.fetch_all().await?;

        let stations = ArchiveExtractor::for_stations(&self.settings).extract_all()?;
        let fires = ArchiveExtractor::for_fires(&self.settings).extract_all()?;

        Ok(AcquisitionReport {
            fetched,
            stations,
            fires,
        })
    }

    /// Years in the configured range whose output artifact does not exist
    pub fn pending_years(&self) -> Vec<u16> {
        self.settings
            .years()
            .filter(|&year| !self.settings.output_path(year).exists())
            .collect()
    }

    pub fn consolidate_year(&self, year: u16) -> Result<YearOutcome> {
        Consolidator::new(&self.settings).consolidate_year(year)
    }

    pub fn consolidate_years(&self, years: &[u16]) -> Result<Vec<(u16, YearOutcome)>> {
        let consolidator = Consolidator::new(&self.settings);
        years
            .iter()
            .map(|&year| consolidator.consolidate_year(year).map(|o| (year, o)))
            .collect()
    }
}
