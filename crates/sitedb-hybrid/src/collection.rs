use std::sync::{Arc, OnceLock};

use sitedb_core::types::{CollectionKind, Document};
use sitedb_text::{KeywordAnalyzer, TermFrequencyTable};
use tracing::debug;

use crate::fields::frequency_fields;

/// One loaded collection. Immutable once built; a reload builds a new value,
/// which also drops the memoized term frequencies.
#[derive(Debug)]
pub struct Collection {
    kind: CollectionKind,
    documents: Vec<Document>,
    term_frequencies: OnceLock<Arc<TermFrequencyTable>>,
}

impl Collection {
    /// Takes ownership of `documents` and numbers them by position.
    pub fn new(kind: CollectionKind, mut documents: Vec<Document>) -> Self {
        for (i, doc) in documents.iter_mut().enumerate() { doc.index = i; }
        Self { kind, documents, term_frequencies: OnceLock::new() }
    }

    pub fn kind(&self) -> CollectionKind { self.kind }
    pub fn documents(&self) -> &[Document] { &self.documents }
    pub fn get(&self, index: usize) -> Option<&Document> { self.documents.get(index) }
    pub fn len(&self) -> usize { self.documents.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    /// Term frequencies over this collection, built on first use. Concurrent
    /// first callers may each build a table; the first one stored is kept.
    pub fn term_frequencies(&self, analyzer: &KeywordAnalyzer) -> Arc<TermFrequencyTable> {
        if let Some(table) = self.term_frequencies.get() { return Arc::clone(table); }
        let built = Arc::new(TermFrequencyTable::build(&self.documents, frequency_fields(self.kind), analyzer));
        if self.term_frequencies.set(Arc::clone(&built)).is_err() {
            debug!(kind = %self.kind, "term frequency table built concurrently; keeping the stored one");
        }
        self.term_frequencies.get().map(Arc::clone).unwrap_or(built)
    }

    pub fn has_term_frequencies(&self) -> bool { self.term_frequencies.get().is_some() }
}
