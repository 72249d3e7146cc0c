// ============================================================
// CLEAN TABLE SINK
// ============================================================
// Persist the normalized table as the hand-off to downstream stages

use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::info;

use super::CsvParser;
use crate::domain::error::{AppError, Result};
use crate::domain::table::{Table, Value};
use crate::infrastructure::storage::atomic_write_bytes;

/// Canonical location of the clean table
pub struct CleanTableSink {
    path: PathBuf,
}

impl CleanTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the persisted clean table. No index column is written.
    pub fn write(&self, table: &Table) -> Result<()> {
        let bytes = to_csv_bytes(table)?;
        atomic_write_bytes(&self.path, &bytes)?;
        info!(
            "Cleaned data saved to {} ({} rows)",
            self.path.display(),
            table.row_count()
        );
        Ok(())
    }

    /// Reload the persisted clean table
    pub fn read(&self) -> Result<Table> {
        if !self.path.exists() {
            return Err(AppError::SourceNotFound(format!(
                "Clean CSV not found at {}. Run preprocess first.",
                self.path.display()
            )));
        }

        Ok(CsvParser::new().load(&self.path)?.table)
    }
}

fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    // A header-less table is an empty file, which reloads as the same table
    if table.column_count() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Value::render))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Io(format!("Failed to flush CSV writer: {}", e)))
}
