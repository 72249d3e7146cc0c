pub mod use_cases;

pub use use_cases::aggregation::AggregationEngine;
pub use use_cases::insights::{collect_insights, ReportHandoff};
pub use use_cases::normalizer::SchemaNormalizer;
pub use use_cases::pipeline::{Analysis, InsightPipeline, PreprocessReport};
pub use use_cases::summary::SummaryEngine;
