pub mod openai;

use crate::domain::pipeline_config::SummarizerConfig;
use async_trait::async_trait;
use openai::OpenAiSummarizer;

pub const UNAVAILABLE_PLACEHOLDER: &str =
    "AI key not set. To enable AI summaries, add OPENAI_API_KEY in a .env file.";

/// Free-text summarizer used for chart insights.
/// Never fails: errors come back as text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> String;

    fn is_available(&self) -> bool {
        true
    }
}

/// Stand-in used when no API key is configured
pub struct UnavailableSummarizer;

#[async_trait]
impl Summarizer for UnavailableSummarizer {
    async fn summarize(&self, _prompt: &str) -> String {
        UNAVAILABLE_PLACEHOLDER.to_string()
    }

    fn is_available(&self) -> bool {
        false
    }
}

pub fn summarizer_for(config: &SummarizerConfig) -> Box<dyn Summarizer> {
    if config.is_configured() {
        Box::new(OpenAiSummarizer::new(config.clone()))
    } else {
        Box::new(UnavailableSummarizer)
    }
}
