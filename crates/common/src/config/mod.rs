//! Configuration management for PaperLens
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/*.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub challenge: ChallengeConfig,

    #[serde(default)]
    pub recommend: RecommendConfig,
}

/// Text-generation backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Chat-completions endpoint
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// API key (empty disables the production backend)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Sampling temperature; zero for reproducible output
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Per-request timeout
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Internal retries on transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Summarizer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryConfig {
    /// Corpora shorter than this short-circuit to an
    /// insufficient-content summary
    #[serde(default = "default_summary_min_chars")]
    pub min_corpus_chars: usize,

    /// Target abstract length in words
    #[serde(default = "default_summary_max_words")]
    pub max_words: usize,

    /// Run the grammar-polish pass by default
    #[serde(default = "default_polish")]
    pub polish: bool,
}

/// Challenge engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallengeConfig {
    /// Questions per generated batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Minimum corpus length for challenge generation
    #[serde(default = "default_challenge_min_chars")]
    pub min_corpus_chars: usize,
}

/// Recommendation client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendConfig {
    /// Bibliographic search API base URL
    #[serde(default = "default_recommend_base_url")]
    pub base_url: String,

    /// Maximum results per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Result cache TTL in seconds
    #[serde(default = "default_recommend_ttl")]
    pub cache_ttl_secs: u64,

    /// Per-request timeout
    #[serde(default = "default_recommend_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_generation_model() -> String {
    crate::DEFAULT_GENERATION_MODEL.to_string()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> usize {
    1000
}
fn default_generation_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    1
}
fn default_summary_min_chars() -> usize {
    80
}
fn default_summary_max_words() -> usize {
    200
}
fn default_polish() -> bool {
    true
}
fn default_batch_size() -> usize {
    3
}
fn default_challenge_min_chars() -> usize {
    200
}
fn default_recommend_base_url() -> String {
    "http://export.arxiv.org/api/query".to_string()
}
fn default_max_results() -> usize {
    5
}
fn default_recommend_ttl() -> u64 {
    3600
}
fn default_recommend_timeout() -> u64 {
    20
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            api_key: None,
            model: default_generation_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_generation_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            min_corpus_chars: default_summary_min_chars(),
            max_words: default_summary_max_words(),
            polish: default_polish(),
        }
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            min_corpus_chars: default_challenge_min_chars(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            base_url: default_recommend_base_url(),
            max_results: default_max_results(),
            cache_ttl_secs: default_recommend_ttl(),
            timeout_secs: default_recommend_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            summary: SummaryConfig::default(),
            challenge: ChallengeConfig::default(),
            recommend: RecommendConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__GENERATION__MODEL=gpt-4o
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get generation request timeout as Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }

    /// Get recommendation cache TTL as Duration
    pub fn recommend_ttl(&self) -> Duration {
        Duration::from_secs(self.recommend.cache_ttl_secs)
    }
}
