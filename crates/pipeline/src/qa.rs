//! Grounded question answering
//!
//! Answers are restricted to the corpus and carry a verbatim supporting
//! snippet; when the corpus lacks the information, the engine says so
//! explicitly instead of fabricating. Prior turns are passed as context
//! so follow-up questions can refer back to them.

use crate::grounding;
use crate::prompts;
use paperlens_common::errors::{PipelineError, Result};
use paperlens_common::llm::GenerationBackend;
use paperlens_ingestion::Corpus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// One completed question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// A grounded answer
///
/// `snippet` is a contiguous verbatim substring of the corpus, or empty
/// when grounding was not possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Answer text
    pub answer: String,

    /// How the snippet supports the answer, or why no answer exists
    pub justification: String,

    /// Verbatim supporting excerpt, empty if none
    pub snippet: String,
}

impl AnswerRecord {
    /// Record for a corpus that lacks the requested information
    fn insufficient(justification: String) -> Self {
        Self {
            answer: "The uploaded documents do not contain this information.".to_string(),
            justification,
            snippet: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawAnswer {
    answer: String,
    #[serde(default)]
    justification: String,
    #[serde(default)]
    snippet: String,
}

/// Question-answering engine over a generation backend
pub struct QaEngine {
    backend: Arc<dyn GenerationBackend>,
}

impl QaEngine {
    /// Create a new engine
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Answer a question against the corpus
    ///
    /// `history` is read-only conversational context; appending the new
    /// turn is the caller's decision, taken only on success.
    pub async fn answer(
        &self,
        corpus: &Corpus,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<AnswerRecord> {
        if corpus.is_empty() {
            return Ok(AnswerRecord::insufficient(
                "No readable content was extracted from the uploaded documents.".to_string(),
            ));
        }

        let prompt = prompts::qa_prompt(corpus.as_str(), question, history);
        let reply = self.backend.complete(&prompt).await?;

        let raw = match parse_reply(&reply) {
            Some(raw) => raw,
            None => {
                // One bounded re-ask for malformed output, then give up
                warn!("QA reply was not parseable JSON, re-asking once");
                let reply = self.backend.complete(&prompt).await?;
                parse_reply(&reply).ok_or_else(|| PipelineError::UnusableOutput {
                    message: "QA reply did not contain a JSON answer object".to_string(),
                })?
            }
        };

        let record = self.ground(corpus, raw);
        debug!(
            question_len = question.len(),
            history_turns = history.len(),
            grounded = !record.snippet.is_empty(),
            "Question answered"
        );
        Ok(record)
    }

    /// Re-locate the model's quote in the corpus so the returned
    /// snippet is verbatim, preferring the earliest occurrence
    fn ground(&self, corpus: &Corpus, raw: RawAnswer) -> AnswerRecord {
        if raw.snippet.trim().is_empty() {
            // Explicit insufficient-information answer, not an error
            let justification = if raw.justification.is_empty() {
                "The documents do not address this question.".to_string()
            } else {
                raw.justification
            };
            return AnswerRecord {
                answer: raw.answer,
                justification,
                snippet: String::new(),
            };
        }

        match grounding::locate_snippet(corpus.as_str(), &raw.snippet) {
            Some(snippet) => AnswerRecord {
                answer: raw.answer,
                justification: raw.justification,
                snippet,
            },
            None => {
                warn!("Model quote not found verbatim in corpus, dropping snippet");
                AnswerRecord {
                    answer: raw.answer,
                    justification: raw.justification,
                    snippet: String::new(),
                }
            }
        }
    }
}

fn parse_reply(reply: &str) -> Option<RawAnswer> {
    let json = prompts::extract_json_object(reply)?;
    serde_json::from_str(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedBackend;

    fn corpus() -> Corpus {
        Corpus::from_text("The sky is blue. Grass is green.")
    }

    fn qa_reply(answer: &str, justification: &str, snippet: &str) -> String {
        serde_json::json!({
            "answer": answer,
            "justification": justification,
            "snippet": snippet,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_grounded_answer_quotes_corpus_verbatim() {
        let backend = Arc::new(ScriptedBackend::with_replies([qa_reply(
            "The sky is blue.",
            "The documents state the sky's color directly.",
            "The sky is blue.",
        )]));
        let engine = QaEngine::new(backend);

        let record = engine
            .answer(&corpus(), "What color is the sky?", &[])
            .await
            .unwrap();

        assert_eq!(record.snippet, "The sky is blue.");
        assert!(corpus().contains(&record.snippet));
        assert!(!record.justification.is_empty());
    }

    #[tokio::test]
    async fn test_unlocatable_quote_is_dropped_not_paraphrased() {
        let backend = Arc::new(ScriptedBackend::with_replies([qa_reply(
            "The sky is blue.",
            "Stated in the documents.",
            "The heavens appear azure.",
        )]));
        let engine = QaEngine::new(backend);

        let record = engine
            .answer(&corpus(), "What color is the sky?", &[])
            .await
            .unwrap();

        assert_eq!(record.snippet, "");
    }

    #[tokio::test]
    async fn test_insufficient_information_is_not_an_error() {
        let backend = Arc::new(ScriptedBackend::with_replies([qa_reply(
            "The documents do not say what color a banana is.",
            "No passage mentions bananas.",
            "",
        )]));
        let engine = QaEngine::new(backend);

        let record = engine
            .answer(&corpus(), "What color is a banana?", &[])
            .await
            .unwrap();

        assert_eq!(record.snippet, "");
        assert!(record.answer.contains("do not"));
    }

    #[tokio::test]
    async fn test_empty_corpus_short_circuits() {
        let backend = Arc::new(ScriptedBackend::with_replies(Vec::<String>::new()));
        let engine = QaEngine::new(backend.clone());

        let record = engine
            .answer(&Corpus::from_text("   "), "Anything?", &[])
            .await
            .unwrap();

        assert_eq!(record.snippet, "");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_history_reaches_the_backend() {
        let backend = Arc::new(ScriptedBackend::with_replies([
            qa_reply("Because of X.", "Follows from the prior answer.", ""),
        ]));
        let engine = QaEngine::new(backend.clone());

        let history = vec![ConversationTurn {
            question: "What is the main method?".into(),
            answer: "X".into(),
        }];
        engine
            .answer(&corpus(), "Why is it effective?", &history)
            .await
            .unwrap();

        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("Prior conversation"));
        assert!(prompt.contains("A1: X"));
    }

    #[tokio::test]
    async fn test_malformed_reply_reasked_once_then_fatal() {
        let backend = Arc::new(ScriptedBackend::with_replies([
            "not json at all",
            "still not json",
        ]));
        let engine = QaEngine::new(backend.clone());

        let err = engine
            .answer(&corpus(), "What color is the sky?", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnusableOutput { .. }));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fenced_json_reply_is_accepted() {
        let backend = Arc::new(ScriptedBackend::with_replies([format!(
            "```json\n{}\n```",
            qa_reply("Green.", "Stated directly.", "Grass is green.")
        )]));
        let engine = QaEngine::new(backend);

        let record = engine
            .answer(&corpus(), "What color is grass?", &[])
            .await
            .unwrap();

        assert_eq!(record.snippet, "Grass is green.");
    }
}
