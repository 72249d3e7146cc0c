pub mod aggregation;
pub mod capability;
pub mod insights;
pub mod normalizer;
pub mod pipeline;
pub mod summary;
