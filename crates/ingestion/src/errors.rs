//! Ingestion error types
//!
//! Ingestion failures are per-file: a failed document contributes an
//! empty segment and the rest of the batch still succeeds.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("PDF parse error in '{name}': {message}")]
    PdfParse { name: String, message: String },

    #[error("Unsupported document format: '{name}'")]
    UnsupportedFormat { name: String },

    #[error("Failed to read '{name}': {message}")]
    Unreadable { name: String, message: String },
}

impl IngestionError {
    /// Name of the offending file
    pub fn file_name(&self) -> &str {
        match self {
            IngestionError::PdfParse { name, .. } => name,
            IngestionError::UnsupportedFormat { name } => name,
            IngestionError::Unreadable { name, .. } => name,
        }
    }
}
