use crate::error::Result;
use crate::settings::Settings;
use crate::utils::constants::ARCHIVE_EXTENSION;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info};
use zip::ZipArchive;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ExtractionSummary {
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Unpacks downloaded archives into per-archive directories.
///
/// Existence of the target directory is the only "already extracted"
/// signal, so unpacking is atomic: contents land in a temp directory next
/// to the targets and are renamed into place on full success. An
/// interrupted run leaves no directory that looks done but is partial.
pub struct ArchiveExtractor {
    archive_dir: PathBuf,
    extraction_dir: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(archive_dir: PathBuf, extraction_dir: PathBuf) -> Self {
        Self {
            archive_dir,
            extraction_dir,
        }
    }

    /// Extractor for the weather-station archive family
    pub fn for_stations(settings: &Settings) -> Self {
        Self::new(
            settings.station_archive_dir(),
            settings.station_extraction_dir(),
        )
    }

    /// Extractor for the satellite fire-occurrence archive family
    pub fn for_fires(settings: &Settings) -> Self {
        Self::new(settings.fire_archive_dir(), settings.fire_extraction_dir())
    }

    /// Extract every archive in the source directory that has no target
    /// directory yet. Corrupt archives are logged and skipped; the year
    /// they carry is simply absent downstream.
    pub fn extract_all(&self) -> Result<ExtractionSummary> {
        fs::create_dir_all(&self.extraction_dir)?;
        let mut summary = ExtractionSummary::default();

        for archive in self.list_archives()? {
            let name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = self.target_dir(&archive);

            if target.exists() {
                info!(file = %name, "already extracted, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.unpack(&archive, &target) {
                Ok(()) => {
                    info!(file = %name, "extracted");
                    summary.extracted += 1;
                }
                Err(e) => {
                    error!(file = %name, cause = %e, "extraction failed");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Target directory: extension stripped from the archive filename
    fn target_dir(&self, archive: &Path) -> PathBuf {
        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.extraction_dir.join(stem)
    }

    fn list_archives(&self) -> Result<Vec<PathBuf>> {
        // A family whose archives were never placed locally is an empty
        // batch, not an error.
        if !self.archive_dir.exists() {
            return Ok(Vec::new());
        }
        let mut archives: Vec<PathBuf> = fs::read_dir(&self.archive_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
            })
            .collect();
        archives.sort();
        Ok(archives)
    }

    fn unpack(&self, archive: &Path, target: &Path) -> Result<()> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(file)?;

        // Same filesystem as the target so the rename is atomic
        let staging = TempDir::new_in(&self.extraction_dir)?;
        zip.extract(staging.path())?;

        fs::rename(staging.path(), target)?;
        // The staging path no longer exists; TempDir's drop cleanup is a no-op
        Ok(())
    }
}
