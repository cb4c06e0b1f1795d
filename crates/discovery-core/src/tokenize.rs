//! Tokenizer shared by index build and query time.
//!
//! Both sides must produce identical terms for identical text, so this is the
//! only place text normalization happens.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from",
    "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need", "this",
    "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "what", "which", "who",
    "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "just",
    "also", "now", "use", "using", "used",
];

/// Terms of length `<= MIN_TERM_LEN` are discarded.
pub const MIN_TERM_LEN: usize = 2;

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(term: &str) -> bool {
    stop_words().contains(term)
}

/// Split text into normalized terms.
///
/// - Lowercase
/// - Maximal runs of ASCII letters and digits; everything else separates
/// - Drop stopwords and terms of two characters or fewer
///
/// Order and duplicates are kept so callers can count term frequency.
///
/// ```
/// use discovery_core::tokenize::tokenize;
///
/// let tokens = tokenize("Optimize the SQL query, optimize!");
/// assert_eq!(tokens, vec!["optimize", "sql", "query", "optimize"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| s.len() > MIN_TERM_LEN && !is_stop_word(s))
        .map(String::from)
        .collect()
}

/// Raw count per distinct term.
pub fn term_counts(tokens: &[String]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    counts
}
