//! Corpus summarization
//!
//! Produces a bounded-length abstract of the corpus, optionally
//! post-processed by a grammar-polish pass. The polish pass may not add
//! claims; if it fails, the draft ships with a degraded-quality marker
//! instead of failing the operation.

use crate::prompts;
use paperlens_common::config::SummaryConfig;
use paperlens_common::errors::Result;
use paperlens_common::llm::GenerationBackend;
use paperlens_ingestion::Corpus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Deterministic summary for an empty or near-empty corpus
pub const INSUFFICIENT_CONTENT_SUMMARY: &str =
    "The uploaded documents did not contain enough readable text to summarize.";

/// A corpus-level abstract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Summary text
    pub text: String,

    /// Whether the grammar-polish pass ran and succeeded
    pub polished: bool,

    /// Whether a requested polish pass failed and the draft was
    /// returned instead
    pub degraded: bool,
}

/// Summarizer over a generation backend
pub struct Summarizer {
    backend: Arc<dyn GenerationBackend>,
    config: SummaryConfig,
}

impl Summarizer {
    /// Create a new summarizer
    pub fn new(backend: Arc<dyn GenerationBackend>, config: SummaryConfig) -> Self {
        Self { backend, config }
    }

    /// Summarize the corpus
    ///
    /// With `polish` the draft is rewritten for grammatical fluency in
    /// a second pass; without it the draft is returned directly, which
    /// is strictly faster.
    pub async fn summarize(&self, corpus: &Corpus, polish: bool) -> Result<Summary> {
        if corpus.is_empty() || corpus.len() < self.config.min_corpus_chars {
            debug!(
                corpus_len = corpus.len(),
                minimum = self.config.min_corpus_chars,
                "Corpus below summary threshold, short-circuiting"
            );
            return Ok(Summary {
                text: INSUFFICIENT_CONTENT_SUMMARY.to_string(),
                polished: false,
                degraded: false,
            });
        }

        let prompt = prompts::summary_prompt(corpus.as_str(), self.config.max_words);
        let draft = self.backend.complete(&prompt).await?.trim().to_string();

        if !polish {
            return Ok(Summary {
                text: draft,
                polished: false,
                degraded: false,
            });
        }

        match self.backend.complete(&prompts::polish_prompt(&draft)).await {
            Ok(polished) if !polished.trim().is_empty() => Ok(Summary {
                text: polished.trim().to_string(),
                polished: true,
                degraded: false,
            }),
            Ok(_) => {
                warn!("Polish pass returned empty output, keeping draft");
                Ok(Summary {
                    text: draft,
                    polished: false,
                    degraded: true,
                })
            }
            Err(e) => {
                warn!(error = %e, "Polish pass failed, keeping draft");
                Ok(Summary {
                    text: draft,
                    polished: false,
                    degraded: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedBackend;
    use paperlens_common::errors::PipelineError;

    fn corpus() -> Corpus {
        Corpus::from_text(
            "This paper studies widget alignment. The method uses gradient descent \
             over widget embeddings. Results show a 12% improvement on the benchmark.",
        )
    }

    #[tokio::test]
    async fn test_empty_corpus_short_circuits() {
        let backend = Arc::new(ScriptedBackend::with_replies(Vec::<String>::new()));
        let summarizer = Summarizer::new(backend.clone(), SummaryConfig::default());

        let summary = summarizer
            .summarize(&Corpus::from_text(""), true)
            .await
            .unwrap();

        assert_eq!(summary.text, INSUFFICIENT_CONTENT_SUMMARY);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unpolished_skips_second_pass() {
        let backend = Arc::new(ScriptedBackend::with_replies(["A draft summary."]));
        let summarizer = Summarizer::new(backend.clone(), SummaryConfig::default());

        let summary = summarizer.summarize(&corpus(), false).await.unwrap();

        assert_eq!(summary.text, "A draft summary.");
        assert!(!summary.polished);
        assert!(!summary.degraded);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_polish_runs_second_pass() {
        let backend = Arc::new(ScriptedBackend::with_replies([
            "a draft summary",
            "A polished summary.",
        ]));
        let summarizer = Summarizer::new(backend.clone(), SummaryConfig::default());

        let summary = summarizer.summarize(&corpus(), true).await.unwrap();

        assert_eq!(summary.text, "A polished summary.");
        assert!(summary.polished);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_polish_degrades_to_draft() {
        let backend = Arc::new(ScriptedBackend::new([
            Ok("A draft summary.".to_string()),
            Err(PipelineError::Generation {
                message: "quota exceeded".into(),
            }),
        ]));
        let summarizer = Summarizer::new(backend, SummaryConfig::default());

        let summary = summarizer.summarize(&corpus(), true).await.unwrap();

        assert_eq!(summary.text, "A draft summary.");
        assert!(!summary.polished);
        assert!(summary.degraded);
    }

    #[tokio::test]
    async fn test_draft_failure_is_fatal_to_the_operation() {
        let backend = Arc::new(ScriptedBackend::new([Err(PipelineError::Generation {
            message: "timeout".into(),
        })]));
        let summarizer = Summarizer::new(backend, SummaryConfig::default());

        assert!(summarizer.summarize(&corpus(), false).await.is_err());
    }
}
