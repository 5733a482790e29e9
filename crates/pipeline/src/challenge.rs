//! Comprehension challenges
//!
//! Generates a fixed-size batch of logic-based questions from the
//! corpus and grades free-text answers against the corpus content,
//! returning a bounded score and explanatory feedback.

use crate::prompts;
use paperlens_common::config::ChallengeConfig;
use paperlens_common::errors::{PipelineError, Result};
use paperlens_common::llm::GenerationBackend;
use paperlens_ingestion::Corpus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum evaluation score
pub const MIN_SCORE: u8 = 0;

/// Maximum evaluation score
pub const MAX_SCORE: u8 = 10;

/// Feedback for an empty or whitespace-only submission
pub const NO_ANSWER_FEEDBACK: &str =
    "No relevant content was provided, so the answer cannot earn credit. \
     Try answering using what the documents say.";

/// One generated logic-based question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub question: String,
}

/// Graded result for a submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Score on the 0..=10 scale
    pub score: u8,

    /// Why the score was given, referencing the corpus where applicable
    pub feedback: String,
}

#[derive(Deserialize)]
struct RawEvaluation {
    score: i64,
    feedback: String,
}

/// Challenge generation and grading engine
pub struct ChallengeEngine {
    backend: Arc<dyn GenerationBackend>,
    config: ChallengeConfig,
}

impl ChallengeEngine {
    /// Create a new engine
    pub fn new(backend: Arc<dyn GenerationBackend>, config: ChallengeConfig) -> Self {
        Self { backend, config }
    }

    /// Generate a batch of pairwise-distinct logic-based questions
    pub async fn generate_challenges(&self, corpus: &Corpus) -> Result<Vec<Challenge>> {
        if corpus.len() < self.config.min_corpus_chars {
            return Err(PipelineError::InsufficientContent {
                operation: "challenge generation".to_string(),
                length: corpus.len(),
                minimum: self.config.min_corpus_chars,
            });
        }

        let prompt = prompts::challenge_prompt(corpus.as_str(), self.config.batch_size);
        let reply = self.backend.complete(&prompt).await?;
        let mut questions = parse_questions(&reply);

        if questions.len() < self.config.batch_size {
            // One bounded re-ask, merging whatever distinct questions
            // the first attempt produced
            warn!(
                got = questions.len(),
                wanted = self.config.batch_size,
                "Challenge batch short, re-asking once"
            );
            let reply = self.backend.complete(&prompt).await?;
            for question in parse_questions(&reply) {
                if !questions.iter().any(|q| same_question(q, &question)) {
                    questions.push(question);
                }
            }
        }

        if questions.len() < self.config.batch_size {
            return Err(PipelineError::UnusableOutput {
                message: format!(
                    "challenge generation produced {} distinct questions, needed {}",
                    questions.len(),
                    self.config.batch_size
                ),
            });
        }

        questions.truncate(self.config.batch_size);
        debug!(count = questions.len(), "Challenge batch generated");
        Ok(questions.into_iter().map(|question| Challenge { question }).collect())
    }

    /// Grade a free-text answer against the corpus
    ///
    /// An empty submission scores the minimum with fixed feedback and
    /// never reaches the backend; it is not an error.
    pub async fn evaluate_answer(
        &self,
        corpus: &Corpus,
        challenge: &Challenge,
        user_answer: &str,
    ) -> Result<Evaluation> {
        if user_answer.trim().is_empty() {
            return Ok(Evaluation {
                score: MIN_SCORE,
                feedback: NO_ANSWER_FEEDBACK.to_string(),
            });
        }

        let prompt = prompts::evaluation_prompt(corpus.as_str(), &challenge.question, user_answer);
        let reply = self.backend.complete(&prompt).await?;

        let raw = match parse_evaluation(&reply) {
            Some(raw) => raw,
            None => {
                warn!("Evaluation reply was not parseable JSON, re-asking once");
                let reply = self.backend.complete(&prompt).await?;
                parse_evaluation(&reply).ok_or_else(|| PipelineError::UnusableOutput {
                    message: "evaluation reply did not contain a JSON score object".to_string(),
                })?
            }
        };

        let score = raw.score.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8;
        debug!(score, "Answer evaluated");
        Ok(Evaluation {
            score,
            feedback: raw.feedback,
        })
    }
}

fn parse_questions(reply: &str) -> Vec<String> {
    let Some(json) = prompts::extract_json_array(reply) else {
        return Vec::new();
    };
    let Ok(raw) = serde_json::from_str::<Vec<String>>(&json) else {
        return Vec::new();
    };

    let mut questions: Vec<String> = Vec::new();
    for question in raw {
        let question = question.trim().to_string();
        if question.is_empty() {
            continue;
        }
        if !questions.iter().any(|q| same_question(q, &question)) {
            questions.push(question);
        }
    }
    questions
}

fn parse_evaluation(reply: &str) -> Option<RawEvaluation> {
    let json = prompts::extract_json_object(reply)?;
    serde_json::from_str(&json).ok()
}

/// Near-duplicate detection: compare questions case-insensitively on
/// their alphanumeric content
fn same_question(a: &str, b: &str) -> bool {
    normalize_question(a) == normalize_question(b)
}

fn normalize_question(q: &str) -> String {
    q.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
