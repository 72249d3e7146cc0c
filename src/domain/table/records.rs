// ============================================================
// TABLE
// ============================================================
// Ordered columns plus rows of cells; every row is as wide as the header

use serde::Serialize;

use super::{ColumnKind, Value};
use crate::domain::error::{AppError, Result};

/// A loaded or normalized table of track records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from typed rows
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = columns.len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AppError::InvalidTable(format!(
                "row {} has {} values, header has {}",
                index,
                row.len(),
                width
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Build a table from raw text cells, typing each column from its contents
    pub fn from_text_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let width = columns.len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AppError::InvalidTable(format!(
                "record {} has {} fields, header has {}",
                index + 1,
                row.len(),
                width
            )));
        }

        let kinds: Vec<ColumnKind> = (0..width)
            .map(|idx| ColumnKind::infer(rows.iter().map(|row| row[idx].as_str())))
            .collect();

        let typed = rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&kinds)
                    .map(|(raw, kind)| Value::parse_cell(raw, *kind))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns,
            rows: typed,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with exactly this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Kind of a column judged from its current cells
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let mut saw_int = false;
        let mut saw_float = false;

        for value in self.column(name)? {
            match value {
                Value::Text(_) => return Some(ColumnKind::Text),
                Value::Int(_) => saw_int = true,
                Value::Float(_) => saw_float = true,
                Value::Missing => {}
            }
        }

        Some(if saw_int && !saw_float {
            ColumnKind::Integer
        } else {
            ColumnKind::Float
        })
    }

    /// Rewrite every column name
    pub fn rename_columns(&mut self, mut rename: impl FnMut(&str) -> String) {
        for column in &mut self.columns {
            *column = rename(column);
        }
    }

    /// Rename a column in place; returns false when `from` does not exist
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace a column's cells in place, or append it as a new last column
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(AppError::InvalidTable(format!(
                "column '{}' has {} values, table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }

        Ok(())
    }

    /// Keep only the rows the predicate accepts, preserving order
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[Value]) -> bool) {
        self.rows.retain(|row| keep(row));
    }
}
