// ============================================================
// CSV PARSER
// ============================================================
// Parse CSV files through the encoding fallback chain

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::SourceEncoding;
use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

/// A table together with the encoding that decoded it
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: Table,
    pub encoding: SourceEncoding,
}

/// CSV parser with encoding fallback
#[derive(Debug, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file, trying each encoding of the chain in order.
    ///
    /// A strict step must both decode and parse without error. When every
    /// strict step fails, a permissive UTF-8 pass is attempted before giving up.
    pub fn load(&self, path: &Path) -> Result<LoadedTable> {
        if !path.exists() {
            return Err(AppError::SourceNotFound(format!(
                "Dataset not found at {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).map_err(|e| AppError::SourceUnreadable {
            path: path.display().to_string(),
            last_error: e.to_string(),
        })?;

        for encoding in SourceEncoding::CHAIN {
            info!("Trying encoding: {}", encoding);
            let attempt = encoding
                .decode(&bytes)
                .and_then(|content| self.parse_content(&content));

            match attempt {
                Ok(table) => {
                    info!(
                        "Read {} with encoding {} ({} rows, {} columns)",
                        path.display(),
                        encoding,
                        table.row_count(),
                        table.column_count()
                    );
                    return Ok(LoadedTable { table, encoding });
                }
                Err(e) => debug!("Encoding {} failed: {}", encoding, e),
            }
        }

        let fallback = SourceEncoding::Utf8Lossy;
        info!("Trying fallback read with encoding {}", fallback);
        let attempt = fallback
            .decode(&bytes)
            .and_then(|content| self.parse_content_permissive(&content));

        match attempt {
            Ok(table) => {
                warn!(
                    "Read {} with permissive fallback ({} rows kept)",
                    path.display(),
                    table.row_count()
                );
                Ok(LoadedTable {
                    table,
                    encoding: fallback,
                })
            }
            Err(e) => Err(AppError::SourceUnreadable {
                path: path.display().to_string(),
                last_error: e.to_string(),
            }),
        }
    }

    /// Parse CSV content.
    ///
    /// Shorter records are padded with missing cells; a record wider than the
    /// header fails the whole parse.
    pub fn parse_content(&self, content: &str) -> Result<Table> {
        let mut reader = Self::reader(content);

        let headers = Self::read_headers(&mut reader)?;
        let width = headers.len();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::Parse(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            if record.len() > width {
                return Err(AppError::Parse(format!(
                    "CSV row {} has {} fields, expected {}",
                    index + 1,
                    record.len(),
                    width
                )));
            }
            rows.push(padded(&record, width));
        }

        Table::from_text_rows(headers, rows)
    }

    /// Parse CSV content tolerating malformed records.
    ///
    /// Records wider than the header and unreadable records are dropped;
    /// shorter records are padded with empty cells.
    pub fn parse_content_permissive(&self, content: &str) -> Result<Table> {
        let mut reader = Self::reader(content);

        let headers = Self::read_headers(&mut reader)?;
        let width = headers.len();

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable CSV row {}: {}", index + 1, e);
                    dropped += 1;
                    continue;
                }
            };

            if record.len() > width {
                warn!(
                    "Skipping CSV row {}: {} fields, expected {}",
                    index + 1,
                    record.len(),
                    width
                );
                dropped += 1;
                continue;
            }

            rows.push(padded(&record, width));
        }

        if dropped > 0 {
            warn!("Dropped {} malformed rows", dropped);
        }

        Table::from_text_rows(headers, rows)
    }

    fn reader(content: &str) -> csv::Reader<&[u8]> {
        ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(content.as_bytes())
    }

    fn read_headers(reader: &mut csv::Reader<&[u8]>) -> Result<Vec<String>> {
        let headers = reader
            .headers()
            .map_err(|e| AppError::Parse(format!("Failed to read CSV headers: {}", e)))?;
        Ok(headers.iter().map(str::to_string).collect())
    }
}

fn padded(record: &StringRecord, width: usize) -> Vec<String> {
    let mut row: Vec<String> = record.iter().map(str::to_string).collect();
    row.resize(width, String::new());
    row
}
