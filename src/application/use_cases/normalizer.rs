// ============================================================
// SCHEMA NORMALIZER
// ============================================================
// Canonical column names, derived fields and duplicate removal

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::domain::error::Result;
use crate::domain::table::columns::{
    ARTISTS, ARTIST_NAME, DURATION_MIN, DURATION_MS, RELEASE_DATE, TRACK_NAME, YEAR,
};
use crate::domain::table::{Table, Value};

/// Columns that identify a track for duplicate removal, when present
const DEDUP_KEYS: &[&str] = &[TRACK_NAME, ARTIST_NAME, YEAR];

const MS_PER_MINUTE: f64 = 60000.0;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Turns a raw table into the clean table.
/// Applying it to its own output changes nothing.
#[derive(Debug, Default)]
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, mut table: Table) -> Result<Table> {
        table.rename_columns(|name| name.trim().to_string());
        self.reconcile_artist_alias(&mut table);
        self.derive_year(&mut table)?;
        self.derive_duration_minutes(&mut table)?;
        self.drop_duplicates(&mut table);
        Ok(table)
    }

    /// `artists` becomes `artist_name` unless `artist_name` already exists
    fn reconcile_artist_alias(&self, table: &mut Table) {
        if table.has_column(ARTISTS) && !table.has_column(ARTIST_NAME) {
            table.rename_column(ARTISTS, ARTIST_NAME);
            debug!("Renamed column {} to {}", ARTISTS, ARTIST_NAME);
        }
    }

    /// Rewrite `release_date` as ISO dates and derive `year` from it
    fn derive_year(&self, table: &mut Table) -> Result<()> {
        let dates: Vec<Option<NaiveDate>> = match table.column(RELEASE_DATE) {
            Some(values) => values.map(parse_release_date).collect(),
            None => return Ok(()),
        };

        let unparsed = dates.iter().filter(|d| d.is_none()).count();
        if unparsed > 0 {
            debug!("{} release dates could not be parsed", unparsed);
        }

        let iso = dates
            .iter()
            .map(|d| match d {
                Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
                None => Value::Missing,
            })
            .collect();
        let years = dates
            .iter()
            .map(|d| match d {
                Some(date) => Value::Int(date.year() as i64),
                None => Value::Missing,
            })
            .collect();

        table.set_column(RELEASE_DATE, iso)?;
        table.set_column(YEAR, years)
    }

    fn derive_duration_minutes(&self, table: &mut Table) -> Result<()> {
        let minutes: Vec<Value> = match table.column(DURATION_MS) {
            Some(values) => values
                .map(|v| match v.as_f64() {
                    Some(ms) => Value::from_float(ms / MS_PER_MINUTE),
                    None => Value::Missing,
                })
                .collect(),
            None => return Ok(()),
        };

        table.set_column(DURATION_MIN, minutes)
    }

    /// Keep the first row of each key; no key columns means no deduplication
    fn drop_duplicates(&self, table: &mut Table) {
        let key_columns: Vec<usize> = DEDUP_KEYS
            .iter()
            .filter_map(|c| table.column_index(c))
            .collect();

        if key_columns.is_empty() {
            debug!("No deduplication key columns present, keeping all rows");
            return;
        }

        let before = table.row_count();
        let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
        table.retain_rows(|row| seen.insert(key_columns.iter().map(|&i| row[i].key()).collect()));

        info!(
            "Dropped {} duplicate rows ({} -> {})",
            before - table.row_count(),
            before,
            table.row_count()
        );
    }
}

/// Calendar date of a release cell; anything unparseable is `None`
pub fn parse_release_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Int(year) => year_start(*year),
        Value::Float(year) if year.fract() == 0.0 => year_start(*year as i64),
        Value::Text(text) => parse_date_text(text.trim()),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }

    // Year-month precision
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
        return Some(date);
    }

    // Year precision
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<i64>().ok().and_then(year_start);
    }

    None
}

fn year_start(year: i64) -> Option<NaiveDate> {
    if (1..=9999).contains(&year) {
        NaiveDate::from_ymd_opt(year as i32, 1, 1)
    } else {
        None
    }
}
