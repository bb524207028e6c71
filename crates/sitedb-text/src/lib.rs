//! sitedb-text
//!
//! Lexical side of hybrid retrieval: keyword extraction through a tantivy
//! analyzer, whole-word matching over document fields, query pattern
//! detection and collection-wide term frequencies.

pub mod analyzer;
pub mod matching;
pub mod query;
pub mod term_freq;

pub use analyzer::KeywordAnalyzer;
pub use query::QueryContext;
pub use term_freq::{dampening_penalty, TermFrequencyTable};
