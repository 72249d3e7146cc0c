// ============================================================
// INSIGHTS USE CASE
// ============================================================
// Chart and executive summaries, and the report hand-off document

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use super::pipeline::Analysis;
use crate::domain::error::Result;
use crate::domain::report::{ChartId, ImageMap, MetricsMapping};
use crate::infrastructure::llm_clients::Summarizer;
use crate::infrastructure::storage::{atomic_write_bytes, OutputLayout};

pub const EXECUTIVE_KEY: &str = "executive";

pub const EXECUTIVE_PROMPT: &str = "Provide 5 high-level executive insights and next steps for a music streaming product using popularity and feature trends.";

pub fn chart_prompt(chart: ChartId) -> String {
    format!("Provide 2 short insights for the chart titled '{}'.", chart.as_str())
}

/// Ask the summarizer about every rendered chart, plus one executive overview.
/// Returns nothing when the summarizer is unavailable.
pub async fn collect_insights(
    summarizer: &dyn Summarizer,
    images: &ImageMap,
) -> BTreeMap<String, String> {
    let mut insights = BTreeMap::new();
    if !summarizer.is_available() {
        info!("Summarizer unavailable, skipping insights");
        return insights;
    }

    for (chart, _) in images.resolved() {
        let text = summarizer.summarize(&chart_prompt(chart)).await;
        insights.insert(chart.as_str().to_string(), text);
    }

    let text = summarizer.summarize(EXECUTIVE_PROMPT).await;
    insights.insert(EXECUTIVE_KEY.to_string(), text);

    insights
}

/// Document handed to the report assembly step
#[derive(Debug, Serialize)]
pub struct ReportHandoff<'a> {
    pub metrics: &'a MetricsMapping,
    pub images: &'a ImageMap,
    pub insights: BTreeMap<String, String>,
}

impl<'a> ReportHandoff<'a> {
    pub fn new(analysis: &'a Analysis, insights: BTreeMap<String, String>) -> Self {
        Self {
            metrics: &analysis.metrics,
            images: &analysis.images,
            insights,
        }
    }

    pub fn write(&self, layout: &OutputLayout) -> Result<PathBuf> {
        let path = layout.report_handoff_path().to_path_buf();
        let bytes = serde_json::to_vec_pretty(self)?;
        atomic_write_bytes(&path, &bytes)?;
        info!("Report hand-off saved to {}", path.display());
        Ok(path)
    }
}
