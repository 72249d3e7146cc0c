pub mod chart_renderer;
pub mod config;
pub mod llm_clients;
pub mod storage;

// CSV ingestion module
pub mod csv;
