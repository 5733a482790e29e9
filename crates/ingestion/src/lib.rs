//! PaperLens Ingestion Library
//!
//! Turns heterogeneous uploaded documents into one addressable corpus:
//! - Best-effort text extraction from PDF and plain-text inputs
//! - Paragraph-preserving normalization to UTF-8
//! - Upload-order concatenation with explicit document delimiters

pub mod corpus;
pub mod document;
pub mod errors;
mod pdf;

pub use corpus::{ingest_batch, Corpus, IngestOutcome, DOCUMENT_SEPARATOR};
pub use document::{DocumentFormat, DocumentInput};
pub use errors::IngestionError;
