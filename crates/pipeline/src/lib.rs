//! PaperLens Pipeline Library
//!
//! The document intelligence core. Given a corpus assembled by the
//! ingestion crate, this crate provides:
//! - Corpus-level summarization with an optional grammar-polish pass
//! - Grounded question answering with conversational memory
//! - Logic-based comprehension challenges and answer grading
//! - Per-session state with explicit teardown semantics
//!
//! Every operation is a pure function of (corpus, explicit parameters)
//! plus, for QA, the conversation history; generation goes through the
//! pluggable `GenerationBackend` so tests run against deterministic
//! stubs.

pub mod challenge;
pub mod grounding;
mod prompts;
pub mod qa;
pub mod session;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod testutil;

pub use challenge::{Challenge, ChallengeEngine, Evaluation, MAX_SCORE, MIN_SCORE};
pub use qa::{AnswerRecord, ConversationTurn, QaEngine};
pub use session::{ChallengeSlot, SessionState, SlotState};
pub use summarizer::{Summarizer, Summary};
