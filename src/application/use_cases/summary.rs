// ============================================================
// SUMMARY METRICS USE CASE
// ============================================================
// Dataset-level statistics for the report, N/A where inputs are absent

use tracing::debug;

use super::capability::Requires;
use crate::domain::report::{Metric, MetricKey, MetricsMapping};
use crate::domain::table::columns::{ARTIST_NAME, DURATION_MIN, POPULARITY, YEAR};
use crate::domain::table::{Table, Value};
use std::collections::HashSet;

/// One statistic and the columns it needs
struct MetricRule {
    key: MetricKey,
    requires: Requires,
    compute: fn(&Table) -> Metric,
}

const METRIC_RULES: [MetricRule; 5] = [
    MetricRule {
        key: MetricKey::TotalTracks,
        requires: Requires::Nothing,
        compute: total_tracks,
    },
    MetricRule {
        key: MetricKey::UniqueArtists,
        requires: Requires::All(&[ARTIST_NAME]),
        compute: unique_artists,
    },
    MetricRule {
        key: MetricKey::YearsCovered,
        requires: Requires::All(&[YEAR]),
        compute: years_covered,
    },
    MetricRule {
        key: MetricKey::AvgPopularity,
        requires: Requires::All(&[POPULARITY]),
        compute: avg_popularity,
    },
    MetricRule {
        key: MetricKey::AvgDurationMin,
        requires: Requires::All(&[DURATION_MIN]),
        compute: avg_duration_min,
    },
];

/// Dataset-level statistics; each key is computed on its own
#[derive(Debug, Default)]
pub struct SummaryEngine;

impl SummaryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, table: &Table) -> MetricsMapping {
        let entries = METRIC_RULES
            .iter()
            .map(|rule| {
                let metric = if rule.requires.is_satisfied_by(table) {
                    (rule.compute)(table)
                } else {
                    debug!("{} not applicable: required column missing", rule.key);
                    Metric::NotApplicable
                };
                (rule.key, metric)
            })
            .collect();

        MetricsMapping::new(entries)
    }
}

fn total_tracks(table: &Table) -> Metric {
    Metric::Count(table.row_count())
}

fn unique_artists(table: &Table) -> Metric {
    match table.column(ARTIST_NAME) {
        Some(values) => {
            let distinct: HashSet<String> = values.filter_map(Value::key).collect();
            Metric::Count(distinct.len())
        }
        None => Metric::NotApplicable,
    }
}

fn years_covered(table: &Table) -> Metric {
    let years: Vec<i64> = match table.column(YEAR) {
        Some(values) => values.filter_map(Value::as_i64).collect(),
        None => return Metric::NotApplicable,
    };

    match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) => Metric::Range(format!("{} - {}", min, max)),
        _ => Metric::NotApplicable,
    }
}

fn avg_popularity(table: &Table) -> Metric {
    column_mean(table, POPULARITY)
}

fn avg_duration_min(table: &Table) -> Metric {
    column_mean(table, DURATION_MIN)
}

/// Mean ignoring missing cells; no numeric cells means not applicable
fn column_mean(table: &Table, column: &str) -> Metric {
    let Some(values) = table.column(column) else {
        return Metric::NotApplicable;
    };

    let (sum, count) = values
        .filter_map(Value::as_f64)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Metric::NotApplicable;
    }

    let mean = sum / count as f64;
    if mean.is_finite() {
        Metric::Number(mean)
    } else {
        Metric::NotApplicable
    }
}
