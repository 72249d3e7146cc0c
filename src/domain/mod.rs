pub mod error;
pub mod pipeline_config;
pub mod report;

// Tabular data module
pub mod table;
