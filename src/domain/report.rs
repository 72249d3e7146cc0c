use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Serialized form of an absent statistic
pub const NOT_APPLICABLE: &str = "N/A";

// ============================================================
// METRICS MAPPING
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKey {
    TotalTracks,
    UniqueArtists,
    YearsCovered,
    AvgPopularity,
    AvgDurationMin,
}

impl MetricKey {
    pub const ALL: [MetricKey; 5] = [
        MetricKey::TotalTracks,
        MetricKey::UniqueArtists,
        MetricKey::YearsCovered,
        MetricKey::AvgPopularity,
        MetricKey::AvgDurationMin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::TotalTracks => "total_tracks",
            MetricKey::UniqueArtists => "unique_artists",
            MetricKey::YearsCovered => "years_covered",
            MetricKey::AvgPopularity => "avg_popularity",
            MetricKey::AvgDurationMin => "avg_duration_min",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value of one dataset-level statistic
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Count(usize),
    Number(f64),
    Range(String),
    NotApplicable,
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Count(n) => serializer.serialize_u64(*n as u64),
            Metric::Number(v) => serializer.serialize_f64(*v),
            Metric::Range(s) => serializer.serialize_str(s),
            Metric::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Count(n) => write!(f, "{}", n),
            Metric::Number(v) => write!(f, "{}", v),
            Metric::Range(s) => write!(f, "{}", s),
            Metric::NotApplicable => write!(f, "{}", NOT_APPLICABLE),
        }
    }
}

/// Fixed-key statistics handed to the report collaborator, in key order
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsMapping {
    entries: Vec<(MetricKey, Metric)>,
}

impl MetricsMapping {
    pub fn new(entries: Vec<(MetricKey, Metric)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: MetricKey) -> Option<&Metric> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, metric)| metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(MetricKey, Metric)> {
        self.entries.iter()
    }
}

impl Serialize for MetricsMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, metric) in &self.entries {
            map.serialize_entry(key.as_str(), metric)?;
        }
        map.end()
    }
}

// ============================================================
// NAMED IMAGE-DATA MAPPING
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    TopArtists,
    PopularityTrend,
    FeatureCorr,
}

impl ChartId {
    pub const ALL: [ChartId; 3] = [
        ChartId::TopArtists,
        ChartId::PopularityTrend,
        ChartId::FeatureCorr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::TopArtists => "top_artists",
            ChartId::PopularityTrend => "popularity_trend",
            ChartId::FeatureCorr => "feature_corr",
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chart identifier to resolved artifact path, `None` when the chart is absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMap {
    entries: Vec<(ChartId, Option<PathBuf>)>,
}

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chart: ChartId, path: Option<PathBuf>) {
        match self.entries.iter_mut().find(|(c, _)| *c == chart) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((chart, path)),
        }
    }

    /// `None` when the chart is unknown or was not produced
    pub fn get(&self, chart: ChartId) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(c, _)| *c == chart)
            .and_then(|(_, path)| path.as_deref())
    }

    pub fn contains(&self, chart: ChartId) -> bool {
        self.entries.iter().any(|(c, _)| *c == chart)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ChartId, Option<PathBuf>)> {
        self.entries.iter()
    }

    /// Charts that resolved to an artifact
    pub fn resolved(&self) -> impl Iterator<Item = (ChartId, &Path)> {
        self.entries
            .iter()
            .filter_map(|(chart, path)| path.as_deref().map(|p| (*chart, p)))
    }
}

impl Serialize for ImageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (chart, path) in &self.entries {
            map.serialize_entry(chart.as_str(), path)?;
        }
        map.end()
    }
}

// ============================================================
// CHART SERIES
// ============================================================
// Data shapes handed to the chart renderer

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMean {
    pub year: i64,
    pub mean: f64,
}

/// Square Pearson matrix; `None` marks an undefined correlation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartSeries {
    CategoryCounts(Vec<CategoryCount>),
    YearSeries(Vec<YearMean>),
    Correlation(CorrelationMatrix),
}
