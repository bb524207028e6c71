use std::collections::HashSet;
use std::sync::LazyLock;

use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

pub const STOP_WORDS: &[&str] = &[
    "a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
    "about","any","all","some","tell","show","give","find","list","me","you","your","our","been","were","get",
];

/// Keywords shorter than this many characters are dropped.
pub const MIN_KEYWORD_CHARS: usize = 3;
/// Tokens of this many bytes or more are discarded entirely.
pub const MAX_TOKEN_BYTES: usize = 40;

static WORDS: LazyLock<TextAnalyzer> = LazyLock::new(|| {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
        .filter(LowerCaser)
        .build()
});

/// Every lowercased token of `text`, in order. Keyword extraction, term
/// counting and whole-word matching all share this definition of a word.
pub fn words(text: &str) -> Vec<String> { collect(&WORDS, text) }

/// Tokenizes queries and document text the same way: alphanumeric runs,
/// lowercased. The keyword pipeline also removes stop words.
#[derive(Clone)]
pub struct KeywordAnalyzer {
    keywords: TextAnalyzer,
}

impl Default for KeywordAnalyzer {
    fn default() -> Self {
        let keywords = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
            .filter(LowerCaser)
            .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
            .build();
        Self { keywords }
    }
}

impl KeywordAnalyzer {
    pub fn new() -> Self { Self::default() }

    /// Distinct query keywords in first-seen order, stop words and tokens of
    /// two characters or fewer removed.
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        collect(&self.keywords, text)
            .into_iter()
            .filter(|t| t.chars().count() >= MIN_KEYWORD_CHARS)
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// Every lowercased token of `text`, in order.
    pub fn words(&self, text: &str) -> Vec<String> { words(text) }
}

fn collect(analyzer: &TextAnalyzer, text: &str) -> Vec<String> {
    let mut analyzer = analyzer.clone();
    let mut stream = analyzer.token_stream(text);
    let mut out = Vec::new();
    while stream.advance() { out.push(stream.token().text.clone()); }
    out
}
