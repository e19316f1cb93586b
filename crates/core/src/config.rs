//! Configuration management for the Dossier CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - An optional config file (dossier.yaml)
//!
//! Every truncation boundary and retry parameter of the pipeline lives here
//! rather than being hard-coded at the call sites; the defaults are tuned for
//! the Gemini context window.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation service provider (e.g., "gemini")
    pub provider: String,

    /// Model used for selection, extraction, synthesis and enrichment
    pub model: String,

    /// Model used for cross-document summaries
    pub summary_model: String,

    /// API key for the generation service
    pub api_key: Option<String>,

    /// Custom endpoint for the generation service
    pub endpoint: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Pipeline size and truncation limits
    pub limits: Limits,

    /// Retry behavior for generation service calls
    pub retry: RetrySettings,
}

/// Size and truncation limits for the pipeline.
///
/// The character boundaries are heuristic token-budget guesses for the
/// default models; they bound request payloads, not correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Corpus size at or below which the selector returns everything
    /// without consulting the model
    #[serde(default = "default_selection_threshold")]
    pub selection_threshold: usize,

    /// Maximum number of documents the selector may return
    #[serde(default = "default_max_selected")]
    pub max_selected: usize,

    /// Maximum number of documents the corpus accepts
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Content prefix sent when generating a document description
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,

    /// Content head sent when extracting title/date metadata
    #[serde(default = "default_metadata_head_chars")]
    pub metadata_head_chars: usize,

    /// Content tail sent when extracting title/date metadata
    #[serde(default = "default_metadata_tail_chars")]
    pub metadata_tail_chars: usize,

    /// Content prefix sent to the per-document extractor
    #[serde(default = "default_extract_chars")]
    pub extract_chars: usize,

    /// Output token cap for a single extraction
    #[serde(default = "default_extract_max_tokens")]
    pub extract_max_tokens: u32,

    /// Output token cap for a document description
    #[serde(default = "default_description_max_tokens")]
    pub description_max_tokens: u32,

    /// Reasoning-budget hint for document descriptions
    #[serde(default = "default_description_thinking_budget")]
    pub description_thinking_budget: u32,
}

fn default_selection_threshold() -> usize {
    7
}

fn default_max_selected() -> usize {
    30
}

fn default_max_documents() -> usize {
    50
}

fn default_description_chars() -> usize {
    8_000
}

fn default_metadata_head_chars() -> usize {
    4_000
}

fn default_metadata_tail_chars() -> usize {
    4_000
}

fn default_extract_chars() -> usize {
    25_000
}

fn default_extract_max_tokens() -> u32 {
    1_000
}

fn default_description_max_tokens() -> u32 {
    100
}

fn default_description_thinking_budget() -> u32 {
    50
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            selection_threshold: default_selection_threshold(),
            max_selected: default_max_selected(),
            max_documents: default_max_documents(),
            description_chars: default_description_chars(),
            metadata_head_chars: default_metadata_head_chars(),
            metadata_tail_chars: default_metadata_tail_chars(),
            extract_chars: default_extract_chars(),
            extract_max_tokens: default_extract_max_tokens(),
            description_max_tokens: default_description_max_tokens(),
            description_thinking_budget: default_description_thinking_budget(),
        }
    }
}

/// Retry behavior applied to every generation service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, including the first call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds; attempt N waits N × base before retrying
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    limits: Option<Limits>,
    retry: Option<RetrySettings>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    #[serde(rename = "summaryModel")]
    summary_model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            summary_model: "gemini-2.5-pro".to_string(),
            api_key: None,
            endpoint: None,
            log_level: None,
            verbose: false,
            no_color: false,
            limits: Limits::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `DOSSIER_CONFIG`: Path to config file
    /// - `DOSSIER_PROVIDER`: Generation service provider
    /// - `DOSSIER_MODEL`: Primary model identifier
    /// - `DOSSIER_SUMMARY_MODEL`: Summary model identifier
    /// - `DOSSIER_API_KEY`: API key
    /// - `DOSSIER_ENDPOINT`: Custom service endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("DOSSIER_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            PathBuf::from("dossier.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("DOSSIER_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOSSIER_MODEL") {
            config.model = model;
        }

        if let Ok(summary_model) = std::env::var("DOSSIER_SUMMARY_MODEL") {
            config.summary_model = summary_model;
        }

        if let Ok(endpoint) = std::env::var("DOSSIER_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if config.api_key.is_none() {
            config.api_key = std::env::var("DOSSIER_API_KEY").ok();
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(summary_model) = llm.summary_model {
                result.summary_model = summary_model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
            if let Some(env_var) = llm.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(limits) = config_file.limits {
            result.limits = limits;
        }

        if let Some(retry) = config_file.retry {
            result.retry = retry;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration for the active provider.
    ///
    /// A missing requirement here is fatal at startup; nothing later in the
    /// pipeline recovers from a configuration error.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["gemini", "mock"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "gemini" && self.api_key.is_none() {
            return Err(AppError::Config(
                "Gemini provider requires an API key (set DOSSIER_API_KEY)".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(AppError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
