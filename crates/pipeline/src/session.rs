//! Per-session pipeline state
//!
//! All mutable session state (corpus, cached summary, conversation
//! history, challenge slots) lives in one struct owned by the invoking
//! session. There are no process-wide singletons; teardown is dropping
//! the struct, which discards any in-flight results with it.

use crate::challenge::{Challenge, Evaluation};
use crate::qa::ConversationTurn;
use crate::summarizer::Summary;
use paperlens_ingestion::Corpus;
use tracing::info;
use uuid::Uuid;

/// State of one challenge slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Unanswered,
    Evaluated(Evaluation),
}

/// One challenge and its evaluation state
#[derive(Debug, Clone)]
pub struct ChallengeSlot {
    pub challenge: Challenge,
    pub state: SlotState,
}

/// Mutable state for one interactive session
#[derive(Debug, Default)]
pub struct SessionState {
    id: Uuid,
    corpus: Option<Corpus>,
    summary: Option<(bool, Summary)>,
    history: Vec<ConversationTurn>,
    slots: Vec<ChallengeSlot>,
}

impl SessionState {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            ..Self::default()
        }
    }

    /// Session identifier, for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Install a corpus, invalidating every derived artifact
    ///
    /// Called whenever the upload set changes.
    pub fn set_corpus(&mut self, corpus: Corpus) {
        info!(
            session = %self.id,
            corpus_len = corpus.len(),
            segments = corpus.segment_count(),
            "Corpus installed, derived state cleared"
        );
        self.corpus = Some(corpus);
        self.summary = None;
        self.history.clear();
        self.slots.clear();
    }

    /// Current corpus, if one has been ingested
    pub fn corpus(&self) -> Option<&Corpus> {
        self.corpus.as_ref()
    }

    /// Cached summary, valid only for the same polish flag
    pub fn cached_summary(&self, polish: bool) -> Option<&Summary> {
        match &self.summary {
            Some((flag, summary)) if *flag == polish => Some(summary),
            _ => None,
        }
    }

    /// Store a freshly computed summary for the given polish flag
    pub fn store_summary(&mut self, polish: bool, summary: Summary) {
        self.summary = Some((polish, summary));
    }

    /// Conversation history, oldest first
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Append a successful question/answer exchange
    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(ConversationTurn {
            question: question.into(),
            answer: answer.into(),
        });
    }

    /// Install a generated challenge batch, all slots unanswered
    pub fn install_challenges(&mut self, challenges: Vec<Challenge>) {
        self.slots = challenges
            .into_iter()
            .map(|challenge| ChallengeSlot {
                challenge,
                state: SlotState::Unanswered,
            })
            .collect();
    }

    /// Challenge slots in batch order
    pub fn challenge_slots(&self) -> &[ChallengeSlot] {
        &self.slots
    }

    /// Record an evaluation for a slot, overwriting any previous one
    ///
    /// Returns false if the slot index does not exist.
    pub fn record_evaluation(&mut self, slot: usize, evaluation: Evaluation) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                s.state = SlotState::Evaluated(evaluation);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::from_text("Some document text.")
    }

    fn challenges() -> Vec<Challenge> {
        vec![
            Challenge { question: "Q1?".into() },
            Challenge { question: "Q2?".into() },
            Challenge { question: "Q3?".into() },
        ]
    }

    #[test]
    fn test_new_corpus_clears_derived_state() {
        let mut session = SessionState::new();
        session.set_corpus(corpus());
        session.record_turn("Q", "A");
        session.store_summary(
            false,
            Summary {
                text: "S".into(),
                polished: false,
                degraded: false,
            },
        );
        session.install_challenges(challenges());

        session.set_corpus(Corpus::from_text("Replacement text."));

        assert!(session.history().is_empty());
        assert!(session.cached_summary(false).is_none());
        assert!(session.challenge_slots().is_empty());
        assert!(session.corpus().is_some());
    }

    #[test]
    fn test_summary_cache_keyed_on_polish_flag() {
        let mut session = SessionState::new();
        session.store_summary(
            true,
            Summary {
                text: "Polished".into(),
                polished: true,
                degraded: false,
            },
        );

        assert!(session.cached_summary(true).is_some());
        // Flag change invalidates the cached summary
        assert!(session.cached_summary(false).is_none());
    }

    #[test]
    fn test_history_is_append_only_and_ordered() {
        let mut session = SessionState::new();
        session.record_turn("first", "a1");
        session.record_turn("second", "a2");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "first");
        assert_eq!(history[1].question, "second");
    }

    #[test]
    fn test_slot_state_machine_overwrites_on_reevaluation() {
        let mut session = SessionState::new();
        session.install_challenges(challenges());
        assert!(session
            .challenge_slots()
            .iter()
            .all(|s| s.state == SlotState::Unanswered));

        let first = Evaluation {
            score: 4,
            feedback: "Partially correct.".into(),
        };
        assert!(session.record_evaluation(1, first.clone()));
        assert_eq!(session.challenge_slots()[1].state, SlotState::Evaluated(first));

        // Re-evaluation overwrites, it does not accumulate
        let second = Evaluation {
            score: 9,
            feedback: "Much better.".into(),
        };
        assert!(session.record_evaluation(1, second.clone()));
        assert_eq!(
            session.challenge_slots()[1].state,
            SlotState::Evaluated(second)
        );

        assert!(!session.record_evaluation(7, Evaluation {
            score: 0,
            feedback: "out of range".into(),
        }));
    }
}
