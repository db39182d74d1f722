use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use taxa_core::models::ClassificationOptions;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub classification: ClassificationOptions,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generative: GenerativeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerativeConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_generative_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            max_tokens: default_max_tokens(),
            max_retries: 5,
            timeout_secs: default_generative_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_generative_timeout_secs() -> u64 {
    60
}
fn default_max_tokens() -> u32 {
    1024
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl GenerativeConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate classification options
    let options = &config.classification;
    if !(0.0..=1.0).contains(&options.min_auto_classification_score) {
        anyhow::bail!("classification.min_auto_classification_score must be in [0.0, 1.0]");
    }
    if !(0.0..=1.0).contains(&options.min_suggestion_score) {
        anyhow::bail!("classification.min_suggestion_score must be in [0.0, 1.0]");
    }
    if !(0.0..=1.0).contains(&options.keyword_match_weight) {
        anyhow::bail!("classification.keyword_match_weight must be in [0.0, 1.0]");
    }
    if !(0.0..=1.0).contains(&options.semantic_similarity_weight) {
        anyhow::bail!("classification.semantic_similarity_weight must be in [0.0, 1.0]");
    }
    if options.max_suggestions_per_article == 0 {
        anyhow::bail!("classification.max_suggestions_per_article must be >= 1");
    }

    // Validate embedding
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }
    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    // Validate generative
    if config.generative.is_enabled() && config.generative.model.is_none() {
        anyhow::bail!(
            "generative.model must be specified when provider is '{}'",
            config.generative.provider
        );
    }
    match config.generative.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown generative provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(config)
}
