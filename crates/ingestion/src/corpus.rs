//! Corpus assembly
//!
//! The corpus is the immutable, ordered concatenation of every uploaded
//! document's extracted text, joined with an explicit delimiter so a
//! snippet quoted downstream can be traced back to a document region.

use crate::document::{DocumentFormat, DocumentInput};
use crate::errors::IngestionError;
use crate::pdf;
use tracing::{info, warn};

/// Delimiter between documents, visually distinct in quoted snippets
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Immutable normalized text of all uploaded documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    segments: usize,
}

impl Corpus {
    /// Build a corpus from already-normalized text, as one segment
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: 1,
        }
    }

    /// Full corpus text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Corpus length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the corpus holds any non-whitespace content
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of delimiter-separated document segments
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Whether `snippet` appears verbatim in the corpus
    pub fn contains(&self, snippet: &str) -> bool {
        self.text.contains(snippet)
    }

    /// Leading excerpt of at most `max_chars` characters, for use as a
    /// search query
    pub fn head(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}

/// Result of ingesting one upload batch
#[derive(Debug)]
pub struct IngestOutcome {
    /// The assembled corpus; failed documents appear as empty segments
    pub corpus: Corpus,

    /// Per-file failures, each identifying the offending file
    pub failures: Vec<IngestionError>,
}

/// Extract and merge an upload batch, in upload order
///
/// A document that cannot be parsed contributes an empty segment and is
/// recorded in `failures`; the rest of the batch still succeeds.
pub fn ingest_batch(inputs: &[DocumentInput]) -> IngestOutcome {
    let mut segments = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();

    for input in inputs {
        let extracted = match input.format {
            DocumentFormat::Pdf => pdf::extract_text(&input.name, &input.bytes),
            DocumentFormat::PlainText => {
                Ok(String::from_utf8_lossy(&input.bytes).into_owned())
            }
        };

        match extracted {
            Ok(raw) => segments.push(normalize_text(&raw)),
            Err(e) => {
                warn!(document = %input.name, error = %e, "Document failed to ingest");
                failures.push(e);
                segments.push(String::new());
            }
        }
    }

    let corpus = Corpus {
        text: segments.join(DOCUMENT_SEPARATOR),
        segments: inputs.len(),
    };

    info!(
        documents = inputs.len(),
        failures = failures.len(),
        corpus_len = corpus.len(),
        "Ingest batch complete"
    );

    IngestOutcome { corpus, failures }
}

/// Normalize extracted text to clean UTF-8, preserving paragraphs
///
/// Runs of spaces and tabs collapse to one space; runs of blank lines
/// collapse to one blank line so paragraph structure survives.
pub(crate) fn normalize_text(raw: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in raw.lines() {
        let line = line
            .replace('\u{FEFF}', "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&line);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs.join("\n\n")
}
