//! PaperLens Common Library
//!
//! Shared code for the PaperLens document intelligence pipeline:
//! - Error types and handling
//! - Configuration management
//! - Text-generation backend abstraction
//! - In-process TTL caching

pub mod cache;
pub mod config;
pub mod errors;
pub mod llm;

// Re-export commonly used types
pub use cache::Cache;
pub use config::AppConfig;
pub use errors::{PipelineError, Result};
pub use llm::GenerationBackend;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generation model
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";
