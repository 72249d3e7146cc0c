use crate::domain::error::{AppError, Result};
use crate::domain::pipeline_config::PipelineConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "insight.toml";
pub const ENV_PREFIX: &str = "INSIGHT_";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Layers defaults, an optional TOML file and `INSIGHT_*` variables
pub struct ConfigService {
    config_file: PathBuf,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::with_file(DEFAULT_CONFIG_FILE)
    }

    pub fn with_file(path: impl AsRef<Path>) -> Self {
        Self {
            config_file: path.as_ref().to_path_buf(),
        }
    }

    pub fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::file(&self.config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(&self) -> Result<PipelineConfig> {
        let mut config: PipelineConfig = self
            .figment()
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if !config.summarizer.is_configured() {
            config.summarizer.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("absent_{}.toml", Uuid::new_v4()));
        let config: PipelineConfig = ConfigService::with_file(&path).figment().extract().unwrap();

        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("insight_{}.toml", Uuid::new_v4()));
        fs::write(
            &path,
            "input_path = \"raw/tracks.csv\"\ntop_n = 5\n\n[summarizer]\nmodel = \"local-model\"\n",
        )
        .unwrap();

        let config: PipelineConfig = ConfigService::with_file(&path).figment().extract().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.input_path, PathBuf::from("raw/tracks.csv"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.summarizer.model, "local-model");
        assert_eq!(config.clean_file_name, "spotify_clean.csv");
        assert_eq!(config.summarizer.max_tokens, Some(200));
    }
}
