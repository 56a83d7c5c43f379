use crate::error::{PipelineError, Result};
use crate::models::StationTable;
use crate::readers::StationFileReader;
use crate::settings::Settings;
use crate::utils::constants::{DROPPED_COLUMNS, PLACEHOLDER_PREFIX};
use crate::writers::YearlyCsvWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Result of consolidating one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub enum YearOutcome {
    /// The output artifact already existed; nothing was read
    AlreadyDone { path: PathBuf },
    /// A new artifact was written
    Written {
        path: PathBuf,
        files: usize,
        rows: usize,
    },
    /// No station file yielded a usable table; nothing was written
    Empty,
}

/// Merges every station file of a year into one consolidated table.
///
/// Each file is isolated: a failure in one is logged and excluded, never
/// escalated. Station files are processed in sorted-path order, so output
/// row order is deterministic across runs and platforms.
pub struct Consolidator {
    settings: Settings,
    reader: StationFileReader,
    writer: YearlyCsvWriter,
}

impl Consolidator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            reader: StationFileReader::new(),
            writer: YearlyCsvWriter::new(),
        }
    }

    /// Consolidate one year. If the year's artifact exists the year is
    /// permanently done and no source file is opened; delete the artifact
    /// to force a re-derive.
    pub fn consolidate_year(&self, year: u16) -> Result<YearOutcome> {
        let output = self.settings.output_path(year);
        if output.exists() {
            info!(year, path = %output.display(), "output exists, skipping year");
            return Ok(YearOutcome::AlreadyDone { path: output });
        }

        let files = self.station_files(year)?;
        let mut merged: Option<StationTable> = None;
        let mut contributed = 0;

        for path in &files {
            let table = match self.process_file(path, year) {
                Ok(table) => table,
                Err(PipelineError::SchemaTooNarrow { header, data, .. }) => {
                    warn!(
                        path = %path.display(),
                        declared = header,
                        actual = data,
                        "data narrower than header, excluding file"
                    );
                    continue;
                }
                Err(e) => {
                    error!(path = %path.display(), cause = %e, "station file failed, excluding");
                    continue;
                }
            };

            info!(path = %path.display(), rows = table.row_count(), "station file consolidated");
            contributed += 1;

            match merged.as_mut() {
                None => merged = Some(table),
                Some(accumulated) => {
                    if table.columns() != accumulated.columns() {
                        warn!(
                            path = %path.display(),
                            "column set differs from the year's first file, excluding"
                        );
                        contributed -= 1;
                        continue;
                    }
                    accumulated.append_rows(table.into_rows());
                }
            }
        }

        let Some(merged) = merged else {
            info!(year, "no usable station files, nothing written");
            return Ok(YearOutcome::Empty);
        };

        self.writer.write_table(&merged, &output)?;
        info!(
            year,
            files = contributed,
            rows = merged.row_count(),
            path = %output.display(),
            "year consolidated"
        );

        Ok(YearOutcome::Written {
            path: output,
            files: contributed,
            rows: merged.row_count(),
        })
    }

    /// Steps for one station file: parse and repair, append the four
    /// derived columns, then drop denylisted and placeholder columns.
    fn process_file(&self, path: &Path, year: u16) -> Result<StationTable> {
        let parsed = self.reader.read(path)?;
        let mut table = parsed.table;
        let metadata = parsed.metadata;

        table.push_constant_column("ANO", &year.to_string());
        table.push_constant_column("CIDADE", metadata.city_or_empty());
        table.push_constant_column("LATITUDE", metadata.latitude_or_empty());
        table.push_constant_column("LONGITUDE", metadata.longitude_or_empty());

        table.retain_columns(|name| {
            !DROPPED_COLUMNS.contains(&name) && !name.starts_with(PLACEHOLDER_PREFIX)
        });

        Ok(table)
    }

    /// All station files under the year's extracted set, sorted by path.
    /// A missing year directory is an empty year, not an error.
    fn station_files(&self, year: u16) -> Result<Vec<PathBuf>> {
        let year_dir = self
            .settings
            .station_extraction_dir()
            .join(year.to_string());
        if !year_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_csv_files(&year_dir, &mut files)?;
        files.sort();
        Ok(files)
    }
}

fn collect_csv_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_csv_files(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            files.push(path);
        }
    }
    Ok(())
}
