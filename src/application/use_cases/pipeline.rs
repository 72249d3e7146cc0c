// ============================================================
// INSIGHT PIPELINE USE CASE
// ============================================================
// Load -> normalize -> persist, then aggregate and summarize the clean table

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::aggregation::AggregationEngine;
use super::normalizer::SchemaNormalizer;
use super::summary::SummaryEngine;
use crate::domain::error::Result;
use crate::domain::pipeline_config::PipelineConfig;
use crate::domain::report::{ImageMap, MetricsMapping};
use crate::infrastructure::chart_renderer::ChartRenderer;
use crate::infrastructure::csv::{CleanTableSink, CsvParser, SourceEncoding};
use crate::infrastructure::storage::OutputLayout;

/// Outcome of the preprocessing stage
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessReport {
    pub clean_path: PathBuf,
    pub encoding: SourceEncoding,
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub processing_time_ms: u64,
}

/// What the report collaborator receives from the analysis stage
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub metrics: MetricsMapping,
    pub images: ImageMap,
}

pub struct InsightPipeline {
    config: PipelineConfig,
    layout: OutputLayout,
}

impl InsightPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let layout = OutputLayout::new(&config.output_dir, &config.clean_file_name);
        Self { config, layout }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    fn sink(&self) -> CleanTableSink {
        CleanTableSink::new(self.layout.clean_table_path())
    }

    /// Load the raw dataset, normalize it and publish the clean table
    pub fn preprocess(&self) -> Result<PreprocessReport> {
        let start = Instant::now();
        info!("Preprocessing started");

        self.layout.ensure()?;

        let loaded = CsvParser::new().load(&self.config.input_path)?;
        info!("Using encoding: {}", loaded.encoding);
        let raw_rows = loaded.table.row_count();

        let clean = SchemaNormalizer::new().normalize(loaded.table)?;

        let sink = self.sink();
        sink.write(&clean)?;

        info!("Preprocessing finished. Rows: {}", clean.row_count());

        Ok(PreprocessReport {
            clean_path: sink.path().to_path_buf(),
            encoding: loaded.encoding,
            raw_rows,
            clean_rows: clean.row_count(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Reload the clean table and compute chart series and summary metrics
    pub fn analyze(&self, renderer: &dyn ChartRenderer) -> Result<Analysis> {
        info!("Analysis started");

        self.layout.ensure()?;
        let table = self.sink().read()?;

        let images = AggregationEngine::new(self.config.top_n).render_all(&table, renderer);
        let metrics = SummaryEngine::new().summarize(&table);

        info!("Analysis complete");
        Ok(Analysis { metrics, images })
    }

    pub fn run(&self, renderer: &dyn ChartRenderer) -> Result<(PreprocessReport, Analysis)> {
        let report = self.preprocess()?;
        let analysis = self.analyze(renderer)?;
        Ok((report, analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::report::{ChartId, ChartSeries, Metric, MetricKey};
    use std::fs;
    use std::path::Path;
    use uuid::Uuid;

    struct NoArtifacts;

    impl ChartRenderer for NoArtifacts {
        fn render(&self, _chart: ChartId, _series: &ChartSeries) -> Option<PathBuf> {
            None
        }
    }

    fn config_in(root: &Path, input: &Path) -> PipelineConfig {
        PipelineConfig {
            input_path: input.to_path_buf(),
            output_dir: root.join("output"),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_input_halts_before_publishing() {
        let root = std::env::temp_dir().join(format!("insight_pipeline_{}", Uuid::new_v4()));
        let pipeline = InsightPipeline::new(config_in(&root, &root.join("absent.csv")));

        let err = pipeline.preprocess().unwrap_err();
        let published = pipeline.layout().clean_table_path().exists();
        fs::remove_dir_all(&root).ok();

        assert!(matches!(err, AppError::SourceNotFound(_)));
        assert!(!published);
    }

    #[test]
    fn test_unreadable_input_halts_before_publishing() {
        let root = std::env::temp_dir().join(format!("insight_pipeline_{}", Uuid::new_v4()));
        let input = root.join("tracks.csv");
        fs::create_dir_all(&input).unwrap();
        let pipeline = InsightPipeline::new(config_in(&root, &input));

        let err = pipeline.preprocess().unwrap_err();
        let published = pipeline.layout().clean_table_path().exists();
        fs::remove_dir_all(&root).ok();

        match err {
            AppError::SourceUnreadable { last_error, .. } => assert!(!last_error.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!published);
    }

    #[test]
    fn test_analyze_without_clean_table_fails() {
        let root = std::env::temp_dir().join(format!("insight_pipeline_{}", Uuid::new_v4()));
        let pipeline = InsightPipeline::new(config_in(&root, &root.join("absent.csv")));

        let err = pipeline.analyze(&NoArtifacts).unwrap_err();
        fs::remove_dir_all(&root).ok();

        assert!(matches!(err, AppError::SourceNotFound(_)));
    }

    #[test]
    fn test_run_tolerates_missing_artifacts() {
        let root = std::env::temp_dir().join(format!("insight_pipeline_{}", Uuid::new_v4()));
        fs::create_dir_all(&root).unwrap();
        let input = root.join("tracks.csv");
        fs::write(
            &input,
            "track_name,artists,popularity,release_date\nA,X,10,2000-01-01\nA,X,10,2000-01-01\nB,Y,40,2001-01-01\n",
        )
        .unwrap();

        let pipeline = InsightPipeline::new(config_in(&root, &input));
        let (report, analysis) = pipeline.run(&NoArtifacts).unwrap();
        fs::remove_dir_all(&root).ok();

        assert_eq!(report.raw_rows, 3);
        assert_eq!(report.clean_rows, 2);
        assert_eq!(report.encoding, SourceEncoding::Utf8);
        assert_eq!(analysis.metrics.get(MetricKey::AvgPopularity), Some(&Metric::Number(25.0)));
        assert_eq!(analysis.images.iter().count(), 3);
        assert_eq!(analysis.images.resolved().count(), 0);
    }
}
