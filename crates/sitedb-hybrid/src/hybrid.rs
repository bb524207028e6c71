use sitedb_core::types::{sort_by_score, ScoredResult};
use sitedb_text::matching::contains_word;
use sitedb_text::TermFrequencyTable;
use sitedb_vector::search;

use crate::collection::Collection;
use crate::fields::keyword_fields;

/// Vector candidates from `collection`, scored by cosine similarity.
pub fn vector_candidates(
    collection: &Collection,
    vectors: &[Vec<f32>],
    query_vector: &[f32],
    threshold: f32,
    candidate_limit: usize,
) -> Vec<ScoredResult> {
    search(query_vector, vectors, threshold, candidate_limit)
        .into_iter()
        .filter_map(|(i, score)| collection.get(i).map(|doc| ScoredResult::new(doc.clone(), collection.kind(), score)))
        .collect()
}

/// Weighted whole-word matches of `keyword` across the result's keyword fields.
pub fn keyword_contribution(result: &ScoredResult, keyword: &str) -> u32 {
    keyword_fields(result.kind)
        .iter()
        .filter(|(field, _)| result.document.text(*field).is_some_and(|text| contains_word(&text, keyword)))
        .map(|(_, weight)| weight)
        .sum()
}

/// Boosts candidates that contain the query keywords. Each matching
/// keyword's weighted contribution is dampened by its document frequency,
/// and the sum scales the vector score by `1 + total * boost_scale`.
/// Without keywords or candidates the input comes back truncated and unchanged.
pub fn apply_keyword_boost(
    mut candidates: Vec<ScoredResult>,
    keywords: &[String],
    term_frequencies: &TermFrequencyTable,
    boost_scale: f32,
    limit: usize,
) -> Vec<ScoredResult> {
    if keywords.is_empty() || candidates.is_empty() {
        candidates.truncate(limit);
        return candidates;
    }
    for result in &mut candidates {
        let mut matches = 0u32;
        let mut total_boost = 0f32;
        for keyword in keywords {
            let contribution = keyword_contribution(result, keyword);
            if contribution == 0 { continue; }
            matches += contribution;
            total_boost += contribution as f32 * term_frequencies.penalty(keyword);
        }
        result.keyword_matches = Some(matches);
        result.boost = Some(total_boost);
        result.score *= 1.0 + total_boost * boost_scale;
    }
    sort_by_score(&mut candidates);
    candidates.truncate(limit);
    candidates
}
