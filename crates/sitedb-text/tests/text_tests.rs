use proptest::prelude::*;
use sitedb_core::types::{Document, Field};
use sitedb_text::term_freq::UNSEEN_FREQUENCY;
use sitedb_text::{dampening_penalty, KeywordAnalyzer, TermFrequencyTable};

fn doc(title: &str, description: &str) -> Document {
    let mut d = Document::titled(title);
    d.description = Some(description.to_string());
    d
}

#[test]
fn frequencies_count_documents_not_occurrences() {
    let docs = vec![
        doc("Bridge Bridge Bridge", "river bridge"),
        doc("Hospital", "A new bridge wing"),
        doc("School", "classrooms"),
        doc("Airport", "terminal"),
    ];
    let table = TermFrequencyTable::build(&docs, &[Field::Title, Field::Description], &KeywordAnalyzer::new());
    assert_eq!(table.document_count(), 4);
    assert_eq!(table.frequency("bridge"), Some(0.5));
    assert_eq!(table.frequency("hospital"), Some(0.25));
    assert_eq!(table.frequency("missing"), None);
    assert!((table.penalty("bridge") - 0.2).abs() < 1e-6);
    assert!((table.penalty("missing") - dampening_penalty(UNSEEN_FREQUENCY)).abs() < 1e-6);
    assert!((table.penalty("missing") - 1.0).abs() < 1e-6);
}

#[test]
fn ubiquitous_term_is_dampened_to_a_tenth() {
    let docs: Vec<Document> = (0..5).map(|i| doc(&format!("Construction {i}"), "")).collect();
    let table = TermFrequencyTable::build(&docs, &[Field::Title], &KeywordAnalyzer::new());
    assert_eq!(table.frequency("construction"), Some(1.0));
    assert!((table.penalty("construction") - 0.1).abs() < 1e-6);
}

#[test]
fn only_listed_fields_are_counted() {
    let mut d = doc("Clinic", "");
    d.location = Some("Tucson".into());
    let table = TermFrequencyTable::build([&d], &[Field::Title], &KeywordAnalyzer::new());
    assert_eq!(table.frequency("tucson"), None);
    assert_eq!(table.frequency("clinic"), Some(1.0));
}

#[test]
fn empty_collection_builds_empty_table() {
    let table = TermFrequencyTable::build(std::iter::empty::<&Document>(), &[Field::Title], &KeywordAnalyzer::new());
    assert!(table.is_empty());
    assert_eq!(table.penalty("anything"), 1.0);
}

proptest! {
    #[test]
    fn penalty_is_bounded(freq in 0.0001f32..=1.0f32) {
        let p = dampening_penalty(freq);
        prop_assert!(p > 0.0 && p <= 1.0);
    }

    #[test]
    fn non_positive_frequency_is_neutral(freq in -10.0f32..=0.0f32) {
        prop_assert_eq!(dampening_penalty(freq), 1.0);
    }
}
