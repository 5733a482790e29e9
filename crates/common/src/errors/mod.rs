//! Error types for the PaperLens pipeline
//!
//! Provides:
//! - Distinct error types for different failure modes
//! - Transience classification for bounded retry
//! - Human-readable messages for every failure

use thiserror::Error;

/// Result type alias using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline error types
///
/// Grounding failure is deliberately absent: an answer the corpus cannot
/// support is a valid insufficient-information record, not an error.
#[derive(Error, Debug)]
pub enum PipelineError {
    // Generation errors
    #[error("Generation failed: {message}")]
    Generation { message: String },

    #[error("Generation timed out after {timeout_ms}ms")]
    GenerationTimeout { timeout_ms: u64 },

    #[error("Upstream service error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Generation returned unusable output: {message}")]
    UnusableOutput { message: String },

    // Content errors
    #[error("Corpus too small for {operation}: {length} chars, minimum {minimum}")]
    InsufficientContent {
        operation: String,
        length: usize,
        minimum: usize,
    },

    // Infrastructure errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Whether a single bounded retry is worthwhile
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::GenerationTimeout { .. } => true,
            PipelineError::Upstream { status, .. } => *status == 429 || *status >= 500,
            PipelineError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Configuration {
            message: err.to_string(),
        }
    }
}
