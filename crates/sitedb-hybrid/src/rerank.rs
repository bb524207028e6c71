use sitedb_core::types::{sort_by_score, CollectionKind, Document, Field, ScoredResult};
use sitedb_text::matching::{contains_phrase, contains_word};
use sitedb_text::QueryContext;

use crate::fields::rerank_fields;

pub const LOCATION_BONUS: f32 = 5.0;
pub const YEAR_BONUS: f32 = 5.0;
pub const ORGANIZATION_BONUS: f32 = 4.0;
pub const VALUE_BONUS: f32 = 3.0;
pub const AWARD_TYPE_BONUS: f32 = 3.0;

/// Second scoring pass: `score *= 1 + boost * boost_scale` with a fresh
/// boost per result, then a stable re-sort. The caller truncates.
pub fn rerank(mut results: Vec<ScoredResult>, ctx: &QueryContext, boost_scale: f32) -> Vec<ScoredResult> {
    for result in &mut results {
        let boost = rerank_boost(&result.document, result.kind, ctx);
        result.boost = Some(boost);
        result.score *= 1.0 + boost * boost_scale;
    }
    sort_by_score(&mut results);
    results
}

pub fn rerank_boost(doc: &Document, kind: CollectionKind, ctx: &QueryContext) -> f32 {
    let bonus = if ctx.has_patterns() { pattern_bonus(doc, ctx) } else { 0.0 };
    term_presence(doc, kind, &ctx.keywords) + bonus
}

fn term_presence(doc: &Document, kind: CollectionKind, keywords: &[String]) -> f32 {
    let mut boost = 0.0;
    for (field, weight) in rerank_fields(kind) {
        let Some(text) = doc.text(*field) else { continue };
        boost += keywords.iter().filter(|k| contains_word(&text, k)).count() as f32 * weight;
    }
    boost
}

fn pattern_bonus(doc: &Document, ctx: &QueryContext) -> f32 {
    let mut bonus = 0.0;
    if let (Some(place), Some(location)) = (ctx.location.as_deref(), doc.text(Field::Location)) {
        if contains_phrase(&location, place) { bonus += LOCATION_BONUS; }
    }
    if let Some(year) = ctx.year.as_deref() {
        let dated = [Field::Year, Field::Date].into_iter().any(|f| doc.text(f).is_some_and(|t| contains_word(&t, year)));
        if dated { bonus += YEAR_BONUS; }
    }
    if let Some(organization) = doc.text(Field::Organization) {
        if ctx.organizations.iter().any(|o| o.mentioned_in(&organization)) { bonus += ORGANIZATION_BONUS; }
    }
    if ctx.value_focus && (doc.text(Field::Value).is_some() || doc.text(Field::ConstructionValue).is_some()) {
        bonus += VALUE_BONUS;
    }
    let award_hit = ctx.award_terms.iter().any(|term| {
        [Field::Title, Field::Category].into_iter().any(|f| doc.text(f).is_some_and(|t| contains_phrase(&t, term)))
    });
    if award_hit { bonus += AWARD_TYPE_BONUS; }
    bonus
}
