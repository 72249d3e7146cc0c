use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for one pipeline run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Raw dataset to ingest
    pub input_path: PathBuf,

    /// Directory holding the clean table, chart series and report hand-off
    pub output_dir: PathBuf,

    /// File name of the clean table inside `output_dir`
    pub clean_file_name: String,

    /// Number of entities kept by the top-N frequency chart
    pub top_n: usize,

    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/spotify_tracks.csv"),
            output_dir: PathBuf::from("output"),
            clean_file_name: "spotify_clean.csv".to_string(),
            top_n: 10,
            summarizer: SummarizerConfig::default(),
        }
    }
}

/// OpenAI-compatible endpoint used for chart insights
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: Some(200),
            temperature: Some(0.2),
        }
    }
}

impl SummarizerConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}
