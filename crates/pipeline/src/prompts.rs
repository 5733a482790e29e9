//! Prompt construction and model-reply parsing
//!
//! Prompts pin the backend to the corpus and ask for strict JSON where
//! the pipeline needs structured output. Parsing tolerates code fences
//! and prose around the JSON value, nothing more.

use crate::qa::ConversationTurn;
use regex_lite::Regex;

/// Prompt for the draft summary pass
pub fn summary_prompt(corpus: &str, max_words: usize) -> String {
    format!(
        "You are a research assistant. Summarize the following document collection \
        in at most {max_words} words. Cover the main contributions, methods, and \
        findings. Use only information stated in the text.\n\n\
        Documents:\n{corpus}\n\nSummary:"
    )
}

/// Prompt for the grammar-polish pass
///
/// The rewrite must not introduce claims absent from the draft.
pub fn polish_prompt(draft: &str) -> String {
    format!(
        "Rewrite the following summary for grammatical fluency and readability. \
        Keep every factual claim exactly as stated; do not add, remove, or alter \
        any information.\n\nSummary:\n{draft}\n\nRewritten summary:"
    )
}

/// Prompt for grounded question answering
///
/// Prior turns are included so the current question may refer back to
/// them; with no history the block is omitted entirely.
pub fn qa_prompt(corpus: &str, question: &str, history: &[ConversationTurn]) -> String {
    let mut prompt = String::from(
        "You are a research assistant. Answer the question using ONLY the provided \
        documents. If the documents do not contain the information needed, say so \
        explicitly and leave the snippet empty. Do not make up information.\n\n",
    );

    if !history.is_empty() {
        prompt.push_str("Prior conversation (the question may refer to it):\n");
        for (i, turn) in history.iter().enumerate() {
            prompt.push_str(&format!(
                "Q{n}: {q}\nA{n}: {a}\n",
                n = i + 1,
                q = turn.question,
                a = turn.answer
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "Documents:\n{corpus}\n\nQuestion: {question}\n\n\
        Respond with a single JSON object, no other text:\n\
        {{\"answer\": \"the answer\", \
        \"justification\": \"one or two sentences explaining how the quoted text supports the answer\", \
        \"snippet\": \"an exact, word-for-word quote from the documents that supports the answer, or \\\"\\\" if the documents lack the information\"}}\n\
        The snippet must be copied verbatim from the documents, never paraphrased. \
        If several passages would work, quote the earliest one."
    ));

    prompt
}

/// Prompt for generating a batch of comprehension challenges
pub fn challenge_prompt(corpus: &str, count: usize) -> String {
    format!(
        "You are a research assistant creating comprehension questions. From the \
        documents below, write exactly {count} logic-based questions that require \
        inference over the stated facts, such as contrasting ideas, drawing \
        implications, or applying a described method. Do not ask for verbatim \
        lookups. Each question must be answerable from the documents alone and \
        must differ clearly from the others.\n\n\
        Documents:\n{corpus}\n\n\
        Respond with a JSON array of {count} question strings, no other text."
    )
}

/// Prompt for grading a user's answer to a challenge
pub fn evaluation_prompt(corpus: &str, question: &str, user_answer: &str) -> String {
    format!(
        "You are a research assistant grading a reader's answer against the \
        documents below. Judge correctness using only the documents, not outside \
        knowledge. Tolerate paraphrase, give partial credit for partially correct \
        answers, and score from 0 (no relevant content) to 10 (fully correct). \
        The feedback must explain why the score was given, referencing the \
        documents where applicable.\n\n\
        Documents:\n{corpus}\n\n\
        Question: {question}\n\
        Reader's answer: {user_answer}\n\n\
        Respond with a single JSON object, no other text:\n\
        {{\"score\": <integer 0-10>, \"feedback\": \"why the answer earned this score\"}}"
    )
}

/// Pull the first JSON object out of a model reply
pub fn extract_json_object(reply: &str) -> Option<String> {
    let stripped = strip_code_fences(reply);
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(&stripped).map(|m| m.as_str().to_string())
}

/// Pull the first JSON array out of a model reply
pub fn extract_json_array(reply: &str) -> Option<String> {
    let stripped = strip_code_fences(reply);
    let re = Regex::new(r"(?s)\[.*\]").ok()?;
    re.find(&stripped).map(|m| m.as_str().to_string())
}

fn strip_code_fences(reply: &str) -> String {
    reply
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}
