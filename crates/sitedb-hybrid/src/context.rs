//! Packs ranked results into the record block handed to the generation step.

use sitedb_core::config::ContextSettings;
use sitedb_core::types::{CollectionKind, Document, Field, ScoredResult};
use tracing::debug;

/// Results past this rank are skipped rather than condensed when they do not fit.
pub const CONDENSED_CANDIDATES: usize = 3;
pub const EXCERPT_CHARS: usize = 100;
const SEPARATOR: &str = "\n\n";

/// Rough token count: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize { text.chars().count() / 4 }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAssembler {
    budget_tokens: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self { Self::from_settings(&ContextSettings::default()) }
}

impl ContextAssembler {
    pub fn new(budget_tokens: usize) -> Self { Self { budget_tokens } }
    pub fn from_settings(settings: &ContextSettings) -> Self { Self::new(settings.budget_tokens) }

    /// Best results first, each as a full block while the budget allows. The
    /// top three fall back to a condensed block when the full one does not
    /// fit. Each block is charged its own [`estimate_tokens`]; separators are
    /// free. Non-empty input always yields at least the top result
    /// condensed, even over budget.
    pub fn assemble(&self, results: &[ScoredResult]) -> String {
        let mut ordered: Vec<&ScoredResult> = results.iter().collect();
        ordered.sort_by(|a, b| b.score.total_cmp(&a.score));
        let Some(top) = ordered.first().copied() else { return String::new() };

        let mut blocks: Vec<String> = Vec::new();
        let mut used_tokens = 0usize;
        let mut condensed = 0usize;
        for (position, result) in ordered.iter().enumerate() {
            let number = blocks.len() + 1;
            let full = full_block(result, number);
            let cost = estimate_tokens(&full);
            if used_tokens + cost <= self.budget_tokens {
                used_tokens += cost;
                blocks.push(full);
                continue;
            }
            if position < CONDENSED_CANDIDATES {
                let short = condensed_block(result, number);
                let cost = estimate_tokens(&short);
                if used_tokens + cost <= self.budget_tokens {
                    used_tokens += cost;
                    condensed += 1;
                    blocks.push(short);
                }
            }
        }
        if blocks.is_empty() {
            debug!(budget = self.budget_tokens, "no block fits; using the condensed top result");
            return condensed_block(top, 1);
        }
        debug!(results = results.len(), included = blocks.len(), condensed, tokens = used_tokens, "assembled context");
        blocks.join(SEPARATOR)
    }
}

fn header(kind: CollectionKind, number: usize) -> String { format!("{} {number}:", kind.record_label()) }

fn push_field(lines: &mut Vec<String>, label: &str, value: Option<impl AsRef<str>>) {
    if let Some(v) = value { lines.push(format!("{label}: {}", v.as_ref().trim())); }
}

/// Every descriptive field of the record.
pub fn full_block(result: &ScoredResult, number: usize) -> String {
    let doc = &result.document;
    let mut lines = vec![header(result.kind, number), format!("Title: {}", title(doc))];
    match result.kind {
        CollectionKind::Projects => {
            if doc.text(Field::Description).is_some() {
                push_field(&mut lines, "Description", doc.text(Field::Description));
            } else {
                push_field(&mut lines, "Overview", doc.text(Field::Overview));
            }
            for field in [Field::Location, Field::Client, Field::Value, Field::ConstructionValue, Field::DeliveryMethod] {
                push_field(&mut lines, field.label(), doc.text(field));
            }
            push_field(&mut lines, "Features", doc.text(Field::Features));
            push_field(&mut lines, "Specialties", doc.text(Field::Specialties));
        }
        CollectionKind::Awards => {
            for field in [Field::Organization, Field::Category, Field::AwardType, Field::Description, Field::Location] {
                push_field(&mut lines, field.label(), doc.text(field));
            }
            if doc.text(Field::Date).is_some() {
                push_field(&mut lines, "Date", doc.text(Field::Date));
            } else {
                push_field(&mut lines, "Year", doc.text(Field::Year));
            }
            push_field(&mut lines, "Related Projects", doc.text(Field::RelatedProjects));
        }
    }
    lines.join("\n")
}

/// Title, the essential fields and a one-sentence summary.
pub fn condensed_block(result: &ScoredResult, number: usize) -> String {
    let doc = &result.document;
    let mut lines = vec![header(result.kind, number), format!("Title: {}", title(doc))];
    match result.kind {
        CollectionKind::Projects => {
            for field in [Field::Location, Field::Client, Field::Value] {
                push_field(&mut lines, field.label(), doc.text(field));
            }
        }
        CollectionKind::Awards => {
            push_field(&mut lines, "Organization", doc.text(Field::Organization));
            push_field(&mut lines, "Category", doc.text(Field::Category));
            push_field(&mut lines, "Year", doc.when());
        }
    }
    push_field(&mut lines, "Summary", doc.summary().map(|s| excerpt(&s)));
    lines.join("\n")
}

fn title(doc: &Document) -> &str {
    let t = doc.title.trim();
    if t.is_empty() { "Untitled" } else { t }
}

/// First sentence of `text`, at most [`EXCERPT_CHARS`] characters.
pub fn excerpt(text: &str) -> String {
    let text = text.trim();
    let sentence = match text.char_indices().find(|(_, c)| matches!(c, '.' | '!' | '?')) {
        Some((i, c)) => &text[..i + c.len_utf8()],
        None => text,
    };
    if sentence.chars().count() <= EXCERPT_CHARS { return sentence.to_string(); }
    let cut: String = sentence.chars().take(EXCERPT_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}
