// ============================================================
// AGGREGATION ENGINE
// ============================================================
// Chart series computed from the clean table, each behind a column check

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::capability::{gated, Requires};
use crate::domain::report::{
    CategoryCount, ChartId, ChartSeries, CorrelationMatrix, ImageMap, YearMean,
};
use crate::domain::table::columns::{
    ARTISTS, ARTIST_NAME, FEATURE_CANDIDATES, POPULARITY, YEAR,
};
use crate::domain::table::{Table, Value};
use crate::infrastructure::chart_renderer::ChartRenderer;

pub const DEFAULT_TOP_N: usize = 10;

/// Entity columns for the frequency chart, in preference order
const ENTITY_COLUMNS: &[&str] = &[ARTIST_NAME, ARTISTS];

const TREND_COLUMNS: &[&str] = &[YEAR, POPULARITY];

pub struct AggregationEngine {
    top_n: usize,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl AggregationEngine {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Required columns of each chart
    pub fn requirement(chart: ChartId) -> Requires {
        match chart {
            ChartId::TopArtists => Requires::AnyOf(ENTITY_COLUMNS),
            ChartId::PopularityTrend => Requires::All(TREND_COLUMNS),
            ChartId::FeatureCorr => Requires::AtLeast(2, FEATURE_CANDIDATES),
        }
    }

    /// Most frequent entities, ties kept in first-seen order
    pub fn top_entities(&self, table: &Table) -> Option<Vec<CategoryCount>> {
        let requires = Self::requirement(ChartId::TopArtists);
        gated(table, requires, |t| {
            let column = requires.present_in(t).into_iter().next()?;
            Some(top_n_counts(t.column(column)?, self.top_n))
        })
    }

    /// Mean popularity per year, ascending by year
    pub fn popularity_trend(&self, table: &Table) -> Option<Vec<YearMean>> {
        gated(table, Self::requirement(ChartId::PopularityTrend), |t| {
            Some(grouped_mean(t.column(YEAR)?, t.column(POPULARITY)?))
        })
    }

    /// Pearson matrix over the numeric candidate feature columns
    pub fn feature_correlation(&self, table: &Table) -> Option<CorrelationMatrix> {
        let requires = Self::requirement(ChartId::FeatureCorr);
        gated(table, requires, |t| {
            let numeric: Vec<&str> = requires
                .present_in(t)
                .into_iter()
                .filter(|c| t.column_kind(c).map(|k| k.is_numeric()).unwrap_or(false))
                .collect();

            if numeric.is_empty() {
                debug!("No numeric feature columns, skipping correlation");
                return None;
            }

            let data: Vec<Vec<Option<f64>>> = numeric
                .iter()
                .map(|c| {
                    t.column(c)
                        .map(|values| values.map(Value::as_f64).collect())
                        .unwrap_or_default()
                })
                .collect();

            Some(correlation_matrix(
                numeric.iter().map(|c| c.to_string()).collect(),
                &data,
            ))
        })
    }

    /// Every chart's series, or `None` where its columns are missing
    pub fn series(&self, table: &Table) -> Vec<(ChartId, Option<ChartSeries>)> {
        ChartId::ALL
            .iter()
            .map(|&chart| {
                let series = match chart {
                    ChartId::TopArtists => self.top_entities(table).map(ChartSeries::CategoryCounts),
                    ChartId::PopularityTrend => {
                        self.popularity_trend(table).map(ChartSeries::YearSeries)
                    }
                    ChartId::FeatureCorr => {
                        self.feature_correlation(table).map(ChartSeries::Correlation)
                    }
                };
                (chart, series)
            })
            .collect()
    }

    /// Hand each available series to the renderer and record the artifacts
    pub fn render_all(&self, table: &Table, renderer: &dyn ChartRenderer) -> ImageMap {
        let mut images = ImageMap::new();
        for (chart, series) in self.series(table) {
            let path = match series {
                Some(series) => renderer.render(chart, &series),
                None => {
                    info!("Chart {} skipped: required columns missing", chart);
                    None
                }
            };
            images.insert(chart, path);
        }
        images
    }
}

/// Count distinct non-missing values and keep the `n` most frequent
pub fn top_n_counts<'a>(values: impl Iterator<Item = &'a Value>, n: usize) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for key in values.filter_map(Value::key) {
        match positions.get(&key) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push(CategoryCount {
                    label: key,
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// Mean of `values` grouped by the integral `keys`; undefined means are dropped
pub fn grouped_mean<'a>(
    keys: impl Iterator<Item = &'a Value>,
    values: impl Iterator<Item = &'a Value>,
) -> Vec<YearMean> {
    let mut groups: BTreeMap<i64, (f64, usize)> = BTreeMap::new();

    for (key, value) in keys.zip(values) {
        let Some(year) = key.as_i64() else {
            continue;
        };
        let entry = groups.entry(year).or_insert((0.0, 0));
        if let Some(v) = value.as_f64() {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(year, (sum, count))| YearMean {
            year,
            mean: sum / count as f64,
        })
        .collect()
}

/// Symmetric matrix of pairwise Pearson coefficients
pub fn correlation_matrix(columns: Vec<String>, data: &[Vec<Option<f64>>]) -> CorrelationMatrix {
    let n = data.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        values[i][i] = pearson(&data[i], &data[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { columns, values }
}

/// Pearson coefficient over rows where both sides are present.
/// Undefined for fewer than two pairs or a constant side.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let (first_x, first_y) = pairs[0];
    if pairs.iter().all(|&(a, _)| a == first_x) || pairs.iter().all(|&(_, b)| b == first_y) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    Some((sxy / denominator).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::ChartSeries;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    struct RecordingRenderer {
        rendered: RefCell<Vec<ChartId>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, chart: ChartId, _series: &ChartSeries) -> Option<PathBuf> {
            self.rendered.borrow_mut().push(chart);
            match chart {
                ChartId::PopularityTrend => None,
                other => Some(PathBuf::from(format!("{}.json", other))),
            }
        }
    }

    #[test]
    fn test_top_n_counts_orders_by_count_then_first_seen() {
        let values: Vec<Value> = ["A", "B", "A", "C", "B", "A"].iter().map(|s| text(s)).collect();
        let top = top_n_counts(values.iter(), 2);

        assert_eq!(
            top,
            vec![
                CategoryCount { label: "A".to_string(), count: 3 },
                CategoryCount { label: "B".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_top_n_counts_ties_and_short_input() {
        let values = vec![text("C"), text("B"), Value::Missing, text("B"), text("C"), text("D")];
        let top = top_n_counts(values.iter(), 10);

        let labels: Vec<&str> = top.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "B", "D"]);
    }

    #[test]
    fn test_top_entities_prefers_canonical_column() {
        let t = table(
            &["artists", "artist_name"],
            vec![vec![text("x"), text("y")], vec![text("x"), text("z")]],
        );
        let top = AggregationEngine::default().top_entities(&t).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "y");

        let alias_only = table(&["artists"], vec![vec![text("x")], vec![text("x")]]);
        let top = AggregationEngine::default().top_entities(&alias_only).unwrap();
        assert_eq!(top[0].count, 2);

        assert!(AggregationEngine::default()
            .top_entities(&table(&["track_name"], vec![]))
            .is_none());
    }

    #[test]
    fn test_popularity_trend_means_by_year() {
        let t = table(
            &["year", "popularity"],
            vec![
                vec![Value::Int(2001), Value::Int(40)],
                vec![Value::Int(2000), Value::Int(10)],
                vec![Value::Int(2000), Value::Int(20)],
                vec![Value::Int(2002), Value::Missing],
                vec![Value::Missing, Value::Int(99)],
            ],
        );
        let trend = AggregationEngine::default().popularity_trend(&t).unwrap();

        assert_eq!(
            trend,
            vec![
                YearMean { year: 2000, mean: 15.0 },
                YearMean { year: 2001, mean: 40.0 },
            ]
        );
    }

    #[test]
    fn test_popularity_trend_requires_both_columns() {
        let t = table(&["year"], vec![vec![Value::Int(2000)]]);
        assert!(AggregationEngine::default().popularity_trend(&t).is_none());
    }

    #[test]
    fn test_correlation_matrix_shape() {
        let t = table(
            &["energy", "loudness", "valence", "tempo", "track_name"],
            vec![
                vec![Value::Float(0.1), Value::Float(-10.0), Value::Float(0.5), text("fast"), text("a")],
                vec![Value::Float(0.2), Value::Float(-8.0), Value::Float(0.5), text("slow"), text("b")],
                vec![Value::Float(0.4), Value::Float(-4.0), Value::Float(0.5), Value::Missing, text("c")],
            ],
        );
        let matrix = AggregationEngine::default().feature_correlation(&t).unwrap();

        assert_eq!(matrix.columns, vec!["energy", "loudness", "valence"]);
        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            }
        }
        assert_eq!(matrix.get("energy", "energy"), Some(1.0));
        assert!((matrix.get("energy", "loudness").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("valence", "valence"), None);
        assert_eq!(matrix.get("energy", "valence"), None);
    }

    #[test]
    fn test_correlation_needs_two_candidates() {
        let t = table(&["energy", "track_name"], vec![vec![Value::Float(0.1), text("a")]]);
        assert!(AggregationEngine::default().feature_correlation(&t).is_none());
    }

    #[test]
    fn test_pearson_negative_and_undefined() {
        let x = vec![Some(1.0), Some(2.0), Some(3.0), None];
        let y = vec![Some(3.0), Some(2.0), Some(1.0), Some(7.0)];
        assert!((pearson(&x, &y).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }

    #[test]
    fn test_render_all_records_absence() {
        let t = table(
            &["artist_name", "year", "popularity"],
            vec![vec![text("x"), Value::Int(2000), Value::Int(50)]],
        );
        let renderer = RecordingRenderer {
            rendered: RefCell::new(Vec::new()),
        };
        let images = AggregationEngine::default().render_all(&t, &renderer);

        assert_eq!(
            *renderer.rendered.borrow(),
            vec![ChartId::TopArtists, ChartId::PopularityTrend]
        );
        assert_eq!(images.get(ChartId::TopArtists), Some(PathBuf::from("top_artists.json").as_path()));
        assert_eq!(images.get(ChartId::PopularityTrend), None);
        assert!(images.contains(ChartId::FeatureCorr));
        assert_eq!(images.get(ChartId::FeatureCorr), None);
    }
}
