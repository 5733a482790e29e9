//! Uploaded document model
//!
//! A `DocumentInput` is a file-like value: a name, a declared format,
//! and raw bytes. Format is declared by file extension, matching the
//! upload surface this pipeline sits behind.

use crate::errors::IngestionError;
use std::path::Path;

/// Recognized document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    /// Detect a format from a file name extension
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Some(DocumentFormat::Pdf),
            Some("txt") => Some(DocumentFormat::PlainText),
            _ => None,
        }
    }
}

/// One uploaded document
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Original file name
    pub name: String,

    /// Declared format
    pub format: DocumentFormat,

    /// Raw file content
    pub bytes: Vec<u8>,
}

impl DocumentInput {
    /// Create a document from in-memory bytes
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes,
        }
    }

    /// Create a document from a file path, detecting the format from
    /// the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestionError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();

        let format = DocumentFormat::from_name(&name)
            .ok_or_else(|| IngestionError::UnsupportedFormat { name: name.clone() })?;

        let bytes = std::fs::read(path).map_err(|e| IngestionError::Unreadable {
            name: name.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name,
            format,
            bytes,
        })
    }
}
