//! Lexical search over the flat-text knowledge corpus.
//!
//! Paragraphs are scored by how many of the query's significant tokens they
//! contain (substring containment, case-insensitive), with a sentence-level
//! fallback when no paragraph clears the bar. Matching is deliberately
//! lexical, not semantic.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "what", "is", "the", "a", "an", "how", "do", "does", "can", "i", "you", "we", "are",
        "to", "for", "of", "with", "on", "at", "by", "from", "as", "about",
    ]
    .into_iter()
    .collect()
});

/// Lowercased query tokens with stop words and short tokens dropped. Falls
/// back to the raw lowercase tokens when filtering would leave nothing.
pub fn significant_tokens(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let filtered: Vec<String> = lowered
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w) && w.len() > 2)
        .map(str::to_string)
        .collect();

    if filtered.is_empty() {
        lowered.split_whitespace().map(str::to_string).collect()
    } else {
        filtered
    }
}

fn score(text: &str, tokens: &[String]) -> usize {
    let lowered = text.to_lowercase();
    tokens.iter().filter(|t| lowered.contains(t.as_str())).count()
}

/// Splits on `.`/`!`/`?` followed by whitespace; the terminator and the
/// whitespace run are consumed.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if (b == b'.' || b == b'!' || b == b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_whitespace()
        {
            sentences.push(&text[start..i]);
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Best local answer for `query`, or None when the corpus has no match.
pub fn search(corpus: &str, query: &str) -> Option<String> {
    let tokens = significant_tokens(query);
    if tokens.is_empty() {
        return None;
    }
    let token_count = tokens.len() as f64;

    // Paragraph pass. Stable sort keeps corpus order on equal scores.
    let mut scored: Vec<(usize, &str)> = corpus
        .split("\n\n")
        .map(|para| (score(para, &tokens), para.trim()))
        .filter(|(s, para)| *s > 0 && !para.is_empty())
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    if let Some(&(top_score, top_para)) = scored.first() {
        if top_score as f64 >= token_count * 0.5 {
            if let Some(&(second_score, second_para)) = scored.get(1) {
                if second_score as f64 >= token_count * 0.3 {
                    return Some(format!("{top_para}\n\n{second_para}"));
                }
            }
            return Some(top_para.to_string());
        }
    }

    // Sentence fallback.
    let mut sentences: Vec<(usize, &str)> = split_sentences(corpus)
        .into_iter()
        .map(|s| (score(s, &tokens), s.trim()))
        .filter(|(score, s)| *score > 0 && !s.is_empty())
        .collect();
    sentences.sort_by(|a, b| b.0.cmp(&a.0));

    if let Some(&(top_score, _)) = sentences.first() {
        if top_score >= 2 {
            let joined = sentences
                .iter()
                .take(3)
                .map(|(_, s)| *s)
                .collect::<Vec<_>>()
                .join(". ");
            return Some(if joined.ends_with('.') {
                joined
            } else {
                format!("{joined}.")
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "Welcome to Ristoro, an online restaurant.\n\n\
        We offer free delivery on orders over $30. Orders below that carry a small delivery fee.\n\n\
        VIP customers earn their status by spending over $100 or placing three complaint-free orders.\n\n\
        Our chefs prepare every dish fresh. Opening hours are 11am to 10pm daily.";

    #[test]
    fn stop_words_and_short_tokens_are_dropped() {
        assert_eq!(significant_tokens("Is delivery free?"), vec!["delivery", "free?"]);
        assert_eq!(significant_tokens("How do you rate a chef"), vec!["rate", "chef"]);
    }

    #[test]
    fn all_stop_words_falls_back_to_raw_tokens() {
        assert_eq!(significant_tokens("how do i"), vec!["how", "do", "i"]);
    }

    #[test]
    fn paragraph_with_half_the_tokens_is_returned_verbatim() {
        let answer = search(CORPUS, "Is delivery free?").unwrap();
        assert_eq!(
            answer,
            "We offer free delivery on orders over $30. Orders below that carry a small delivery fee."
        );
    }

    #[test]
    fn vip_question_hits_vip_paragraph() {
        let answer = search(CORPUS, "how does VIP status work").unwrap();
        assert!(answer.contains("VIP customers earn their status"));
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(search(CORPUS, "quantum entanglement"), None);
    }

    #[test]
    fn tie_scores_keep_corpus_order() {
        let corpus = "alpha beta here.\n\nalpha beta there.";
        let answer = search(corpus, "alpha beta").unwrap();
        // Both paragraphs score 2; the earlier one wins the top slot and the
        // second clears the 0.3 bar, so both come back, top first.
        assert_eq!(answer, "alpha beta here.\n\nalpha beta there.");
    }

    #[test]
    fn second_paragraph_below_bar_is_omitted() {
        let corpus = "orders ship fast and orders arrive hot and orders stay fresh.\n\nunrelated text.";
        let answer = search(corpus, "orders ship arrive fresh").unwrap();
        assert!(!answer.contains("unrelated"));
    }

    #[test]
    fn sentence_fallback_joins_matches_with_period() {
        // Five tokens: each paragraph holds only two, below the 50% bar, so
        // the sentence pass takes over (top sentence scores exactly 2).
        let corpus = "The alpha and bravo teams cook. Nothing else here.\n\n\
                      The charlie desk handles delta questions sometimes. Another filler line.";
        let answer = search(corpus, "alpha bravo charlie delta echo").unwrap();
        assert_eq!(
            answer,
            "The alpha and bravo teams cook. The charlie desk handles delta questions sometimes."
        );
    }

    #[test]
    fn sentence_splitting_consumes_terminator_and_space() {
        let parts = split_sentences("One. Two!  Three? Four");
        assert_eq!(parts, vec!["One", "Two", "Three", "Four"]);
    }
}
