use crate::error::{PipelineError, Result};
use crate::models::StationTable;
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes one consolidated yearly table as UTF-8, comma-delimited CSV.
///
/// The artifact doubles as the consolidation idempotency marker, so it is
/// written to a temp file in the destination directory and renamed into
/// place; an interrupted run never leaves a partial artifact that would
/// mark the year "done".
pub struct YearlyCsvWriter;

impl YearlyCsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_table(&self, table: &StationTable, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = csv::Writer::from_writer(temp.as_file());
            writer.write_record(table.columns())?;
            for row in table.rows() {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

        Ok(())
    }
}

impl Default for YearlyCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
