//! Ingestion, cleaning and summary statistics for music track datasets.
//!
//! The core is a synchronous batch: [`CsvParser`] loads a raw CSV through an
//! encoding fallback chain, [`SchemaNormalizer`] produces the clean table,
//! [`CleanTableSink`] publishes it, and the aggregation and summary engines
//! compute the chart series and metrics handed to the report step.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    AggregationEngine, Analysis, InsightPipeline, PreprocessReport, SchemaNormalizer,
    SummaryEngine,
};
pub use domain::error::{AppError, Result};
pub use domain::pipeline_config::{PipelineConfig, SummarizerConfig};
pub use domain::report::{ChartId, ChartSeries, ImageMap, Metric, MetricKey, MetricsMapping};
pub use domain::table::{Table, Value};
pub use infrastructure::chart_renderer::{ChartRenderer, JsonSeriesRenderer};
pub use infrastructure::csv::{CleanTableSink, CsvParser, LoadedTable, SourceEncoding};
