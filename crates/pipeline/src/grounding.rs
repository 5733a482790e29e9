//! Snippet grounding
//!
//! The QA engine must return a contiguous, verbatim excerpt of the
//! corpus, never a paraphrase. Models quote imperfectly, so a candidate
//! quote is re-located in the corpus: exact match first, then a
//! whitespace-normalized search mapped back to a verbatim corpus slice.
//! The earliest sufficient occurrence wins.

/// Locate a candidate quote in the corpus, returning a verbatim
/// substring of `corpus` or `None` if it cannot be found
pub fn locate_snippet(corpus: &str, candidate: &str) -> Option<String> {
    let candidate = clean_candidate(candidate);
    if candidate.is_empty() {
        return None;
    }

    // Exact quote
    if corpus.contains(candidate) {
        return Some(candidate.to_string());
    }

    // Whitespace differences only: match on normalized text, then map
    // the match back to the original byte range
    let (normalized, offsets) = normalize_with_offsets(corpus);
    let needle = normalize_with_offsets(candidate).0;
    if needle.is_empty() {
        return None;
    }

    let start = normalized.find(&needle)?;
    let end = start + needle.len();

    let orig_start = offsets[start];
    let orig_end = if end < offsets.len() {
        offsets[end]
    } else {
        corpus.len()
    };

    let slice = corpus[orig_start..orig_end].trim();
    if slice.is_empty() {
        None
    } else {
        Some(slice.to_string())
    }
}

/// Strip wrapping quotes and ellipses a model tends to add
fn clean_candidate(candidate: &str) -> &str {
    let mut s = candidate.trim();
    for (open, close) in [('"', '"'), ('\u{201C}', '\u{201D}'), ('\'', '\'')] {
        if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
            s = &s[open.len_utf8()..s.len() - close.len_utf8()];
        }
    }
    s.trim_start_matches("...")
        .trim_end_matches("...")
        .trim_matches('\u{2026}')
        .trim()
}

/// Collapse whitespace runs to single spaces, keeping a map from each
/// byte of the normalized string to the originating byte in `s`
fn normalize_with_offsets(s: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(s.len());
    let mut offsets = Vec::with_capacity(s.len());
    let mut pending_space: Option<usize> = None;

    for (i, ch) in s.char_indices() {
        if ch.is_whitespace() {
            if !out.is_empty() && pending_space.is_none() {
                pending_space = Some(i);
            }
        } else {
            if let Some(space_at) = pending_space.take() {
                out.push(' ');
                offsets.push(space_at);
            }
            out.push(ch);
            for _ in 0..ch.len_utf8() {
                offsets.push(i);
            }
        }
    }

    (out, offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "The sky is blue.\n\nGrass is green,\nand it grows in spring.";

    #[test]
    fn test_exact_match() {
        let snippet = locate_snippet(CORPUS, "The sky is blue.").unwrap();
        assert_eq!(snippet, "The sky is blue.");
        assert!(CORPUS.contains(&snippet));
    }

    #[test]
    fn test_whitespace_normalized_match() {
        // The model flattened a line break into a space
        let snippet = locate_snippet(CORPUS, "Grass is green, and it grows in spring.").unwrap();
        assert_eq!(snippet, "Grass is green,\nand it grows in spring.");
        assert!(CORPUS.contains(&snippet));
    }

    #[test]
    fn test_quoted_and_ellipsized_candidates() {
        let snippet = locate_snippet(CORPUS, "\"The sky is blue.\"").unwrap();
        assert!(CORPUS.contains(&snippet));

        let snippet = locate_snippet(CORPUS, "...Grass is green,...").unwrap();
        assert!(CORPUS.contains(&snippet));
    }

    #[test]
    fn test_paraphrase_is_rejected() {
        assert!(locate_snippet(CORPUS, "The heavens are azure.").is_none());
        assert!(locate_snippet(CORPUS, "").is_none());
        assert!(locate_snippet(CORPUS, "\"\"").is_none());
    }

    #[test]
    fn test_earliest_occurrence_wins() {
        let corpus = "alpha beta. gamma. alpha beta.";
        let (normalized, offsets) = normalize_with_offsets(corpus);
        let start = normalized.find("alpha beta").unwrap();
        assert_eq!(offsets[start], 0);

        let snippet = locate_snippet(corpus, "alpha  beta").unwrap();
        assert_eq!(snippet, "alpha beta");
    }
}
