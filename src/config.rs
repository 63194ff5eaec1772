//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sentivote.toml` files.

use crate::analysis::WeightPolicy;
use crate::classifiers::ClassifierKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sentivote.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Ensemble weight schedules.
    #[serde(default)]
    pub ensemble: WeightPolicy,

    /// Which classifiers take part.
    #[serde(default)]
    pub classifiers: ClassifiersConfig,

    /// Hosted transformer settings.
    #[serde(default)]
    pub transformer: TransformerConfig,

    /// Ollama settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of texts analysed concurrently in batch mode.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Log a progress line every this many rows.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Number of negative items listed in reports.
    #[serde(default = "default_attention_limit")]
    pub attention_limit: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            concurrency: default_concurrency(),
            progress_interval: default_progress_interval(),
            attention_limit: default_attention_limit(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_progress_interval() -> usize {
    100
}

fn default_attention_limit() -> usize {
    10
}

/// Classifier selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiersConfig {
    /// Enabled classifiers in evaluation order.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<ClassifierKind>,

    /// Probe model classifiers at startup and drop the unreachable ones.
    #[serde(default = "default_true")]
    pub probe_on_start: bool,
}

impl Default for ClassifiersConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            probe_on_start: true,
        }
    }
}

fn default_enabled() -> Vec<ClassifierKind> {
    vec![
        ClassifierKind::Transformer,
        ClassifierKind::Valence,
        ClassifierKind::Domain,
        ClassifierKind::Polarity,
    ]
}

fn default_true() -> bool {
    true
}

/// Hosted transformer model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformerConfig {
    /// Inference API base URL.
    #[serde(default = "default_transformer_url")]
    pub url: String,

    /// Model identifier appended to `/models/`.
    #[serde(default = "default_transformer_model")]
    pub model: String,

    /// Bearer token, if the endpoint requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_transformer_timeout")]
    pub timeout_seconds: u64,

    /// Texts are truncated to this many characters before inference.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            url: default_transformer_url(),
            model: default_transformer_model(),
            api_token: None,
            timeout_seconds: default_transformer_timeout(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_transformer_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_transformer_model() -> String {
    "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string()
}

fn default_transformer_timeout() -> u64 {
    30
}

fn default_max_chars() -> usize {
    500 // stays under the 512-token limit of BERT-family models
}

/// Ollama chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Model name.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Temperature for generation.
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            model: default_llm_model(),
            temperature: 0.0,
            timeout_seconds: default_llm_timeout(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.sentivote.toml` from `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the configuration for a run: an explicit path must load,
    /// otherwise `.sentivote.toml` in `dir` is used when present.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::load_from_dir(dir)?.unwrap_or_default()),
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref kinds) = args.classifiers {
            self.classifiers.enabled = kinds.clone();
        }
        if args.no_probe {
            self.classifiers.probe_on_start = false;
        }

        if let Some(ref url) = args.transformer_url {
            self.transformer.url = url.clone();
        }
        if let Some(ref model) = args.transformer_model {
            self.transformer.model = model.clone();
        }
        if let Some(ref token) = args.api_token {
            self.transformer.api_token = Some(token.clone());
        }

        if let Some(ref url) = args.ollama_url {
            self.llm.ollama_url = url.clone();
        }
        if let Some(ref model) = args.llm_model {
            self.llm.model = model.clone();
        }

        // Timeout applies to every remote classifier
        if let Some(timeout) = args.timeout {
            self.transformer.timeout_seconds = timeout;
            self.llm.timeout_seconds = timeout;
        }

        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(interval) = args.progress_interval {
            self.general.progress_interval = interval;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
