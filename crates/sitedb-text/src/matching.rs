//! Whole-word, case-insensitive matching over field text. Tokens come from
//! the analyzer's word pipeline, so a keyword extracted from a query matches
//! exactly the words the term-frequency table counted.

use crate::analyzer::words;

/// True when `word` is a single token that occurs in `text`, ignoring case.
pub fn contains_word(text: &str, word: &str) -> bool {
    match words(word).as_slice() {
        [needle] => words(text).iter().any(|t| t == needle),
        _ => false,
    }
}

/// True when the tokens of `phrase` appear consecutively in `text`.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let needle = words(phrase);
    if needle.is_empty() { return false; }
    words(text).windows(needle.len()).any(|w| w == needle.as_slice())
}
