use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::domain::error::Result;
use crate::domain::report::{ChartId, ChartSeries};
use crate::infrastructure::storage::{atomic_write_bytes, OutputLayout};

/// Turns an aggregate series into an artifact.
/// `None` means no artifact was produced; callers carry on without it.
pub trait ChartRenderer {
    fn render(&self, chart: ChartId, series: &ChartSeries) -> Option<PathBuf>;
}

/// Persists each series as `<chart_id>.json` for an external plotting step
pub struct JsonSeriesRenderer {
    layout: OutputLayout,
}

impl JsonSeriesRenderer {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    fn write(&self, chart: ChartId, series: &ChartSeries) -> Result<PathBuf> {
        let path = self.layout.chart_path(chart);
        let document = json!({
            "chart": chart.as_str(),
            "series": series,
        });
        let bytes = serde_json::to_vec_pretty(&document)?;
        atomic_write_bytes(&path, &bytes)?;
        Ok(path)
    }
}

impl ChartRenderer for JsonSeriesRenderer {
    fn render(&self, chart: ChartId, series: &ChartSeries) -> Option<PathBuf> {
        match self.write(chart, series) {
            Ok(path) => {
                info!("Chart {} written to {}", chart, path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Chart {} not rendered: {}", chart, e);
                None
            }
        }
    }
}
