use std::collections::{HashMap, HashSet};

use sitedb_core::types::{Document, Field};
use tracing::debug;

use crate::analyzer::KeywordAnalyzer;

/// Frequency assumed for a term no document contains.
pub const UNSEEN_FREQUENCY: f32 = 0.01;
/// Terms at or below this document frequency get no dampening.
pub const DAMPENING_FLOOR: f32 = 0.1;

/// `min(1, 0.1 / frequency)`: common terms contribute less to keyword boosts.
pub fn dampening_penalty(frequency: f32) -> f32 {
    if !(frequency > 0.0) { return 1.0; }
    (DAMPENING_FLOOR / frequency).min(1.0)
}

/// Fraction of a collection's documents containing each lowercase term,
/// counted over a fixed set of fields.
#[derive(Debug, Clone, Default)]
pub struct TermFrequencyTable {
    document_count: usize,
    frequencies: HashMap<String, f32>,
}

impl TermFrequencyTable {
    pub fn build<'a, I>(documents: I, fields: &[Field], analyzer: &KeywordAnalyzer) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut document_count = 0usize;
        for doc in documents {
            document_count += 1;
            let mut terms = HashSet::new();
            for field in fields {
                if let Some(text) = doc.text(*field) { terms.extend(analyzer.words(&text)); }
            }
            for term in terms { *counts.entry(term).or_default() += 1; }
        }
        let frequencies = if document_count == 0 {
            HashMap::new()
        } else {
            counts.into_iter().map(|(t, c)| (t, c as f32 / document_count as f32)).collect()
        };
        debug!(documents = document_count, terms = frequencies.len(), "built term frequency table");
        Self { document_count, frequencies }
    }

    pub fn frequency(&self, term: &str) -> Option<f32> { self.frequencies.get(term).copied() }

    pub fn penalty(&self, term: &str) -> f32 {
        dampening_penalty(self.frequency(term).unwrap_or(UNSEEN_FREQUENCY))
    }

    pub fn document_count(&self) -> usize { self.document_count }
    pub fn len(&self) -> usize { self.frequencies.len() }
    pub fn is_empty(&self) -> bool { self.frequencies.is_empty() }
}
