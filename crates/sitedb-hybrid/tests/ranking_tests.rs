use sitedb_core::types::{CollectionKind, Document, ScoredResult};
use sitedb_hybrid::fields::frequency_fields;
use sitedb_hybrid::hybrid::{apply_keyword_boost, keyword_contribution};
use sitedb_hybrid::rerank::{rerank, rerank_boost};
use sitedb_text::{KeywordAnalyzer, QueryContext, TermFrequencyTable};

fn project(title: &str, location: &str) -> Document {
    let mut d = Document::titled(title);
    d.location = Some(location.into());
    d
}

fn award(title: &str, organization: &str, year: &str) -> Document {
    let mut d = Document::titled(title);
    d.organization = Some(organization.into());
    d.year = Some(year.into());
    d
}

fn table(docs: &[Document], kind: CollectionKind) -> TermFrequencyTable {
    TermFrequencyTable::build(docs, frequency_fields(kind), &KeywordAnalyzer::new())
}

fn ctx(query: &str) -> QueryContext { QueryContext::parse(query, &KeywordAnalyzer::new()) }

fn titles(results: &[ScoredResult]) -> Vec<&str> { results.iter().map(|r| r.document.title.as_str()).collect() }

#[test]
fn keyword_contribution_sums_field_weights() {
    let mut doc = project("San Antonio Bridge", "San Antonio, TX");
    doc.client = Some("City of San Antonio".into());
    doc.description = Some("A bridge.".into());
    let result = ScoredResult::new(doc, CollectionKind::Projects, 0.5);
    assert_eq!(keyword_contribution(&result, "antonio"), 3 + 2 + 2);
    assert_eq!(keyword_contribution(&result, "bridge"), 3 + 1);
    assert_eq!(keyword_contribution(&result, "phoenix"), 0);
}

#[test]
fn rare_keyword_boosts_without_dampening() {
    let mut docs: Vec<Document> = (0..9).map(|i| project(&format!("Clinic {i}"), "Tucson, AZ")).collect();
    docs.push(project("River Bridge", "San Antonio, TX"));
    let tf = table(&docs, CollectionKind::Projects);
    let candidates = vec![
        ScoredResult::new(docs[9].clone(), CollectionKind::Projects, 0.5),
        ScoredResult::new(docs[0].clone(), CollectionKind::Projects, 0.6),
    ];
    let out = apply_keyword_boost(candidates, &["bridge".to_string()], &tf, 0.05, 10);
    assert_eq!(titles(&out), vec!["Clinic 0", "River Bridge"]);
    assert_eq!(out[1].keyword_matches, Some(3));
    assert!((out[1].score - 0.5 * (1.0 + 3.0 * 0.05)).abs() < 1e-6);
    assert!((out[0].score - 0.6).abs() < 1e-6);
    assert_eq!(out[0].keyword_matches, Some(0));
}

#[test]
fn common_keyword_is_dampened() {
    let docs: Vec<Document> = (0..10).map(|i| project(&format!("Construction {i}"), "Tucson, AZ")).collect();
    let tf = table(&docs, CollectionKind::Projects);
    let candidates = vec![ScoredResult::new(docs[0].clone(), CollectionKind::Projects, 0.5)];
    let out = apply_keyword_boost(candidates, &["construction".to_string()], &tf, 0.05, 10);
    let boost = out[0].boost.unwrap();
    assert!((boost - 0.3).abs() < 1e-6, "{boost}");
}

#[test]
fn no_keywords_leaves_candidates_alone() {
    let docs = vec![project("A", "X"), project("B", "Y"), project("C", "Z")];
    let tf = table(&docs, CollectionKind::Projects);
    let candidates: Vec<_> = docs.iter().map(|d| ScoredResult::new(d.clone(), CollectionKind::Projects, 0.4)).collect();
    let out = apply_keyword_boost(candidates, &[], &tf, 0.05, 2);
    assert_eq!(titles(&out), vec!["A", "B"]);
    assert!(out.iter().all(|r| r.keyword_matches.is_none() && r.score == 0.4));
}

#[test]
fn location_phrase_outranks_other_cities() {
    let query = ctx("bridge projects in San Antonio");
    let results = vec![
        ScoredResult::new(project("Bridge Maintenance", "Phoenix, AZ"), CollectionKind::Projects, 0.5),
        ScoredResult::new(project("San Antonio River Bridge", "San Antonio, TX"), CollectionKind::Projects, 0.5),
    ];
    let ranked = rerank(results, &query, 0.1);
    assert_eq!(titles(&ranked), vec!["San Antonio River Bridge", "Bridge Maintenance"]);
    assert!(ranked[0].boost.unwrap() >= 5.0);
}

#[test]
fn enr_2022_award_beats_abc_2019() {
    let query = ctx("ENR award 2022");
    let enr = award("Excellence Award", "ENR", "2022");
    let abc = award("Excellence Award", "ABC", "2019");
    assert!((rerank_boost(&enr, CollectionKind::Awards, &query) - (3.0 + 2.5 + 1.5 + 4.0 + 5.0)).abs() < 1e-6);
    assert!((rerank_boost(&abc, CollectionKind::Awards, &query) - 3.0).abs() < 1e-6);

    let ranked = rerank(
        vec![ScoredResult::new(abc, CollectionKind::Awards, 0.5), ScoredResult::new(enr, CollectionKind::Awards, 0.5)],
        &query,
        0.1,
    );
    assert_eq!(ranked[0].document.organization.as_deref(), Some("ENR"));
    assert!(ranked[0].score > ranked[1].score);
}

#[test]
fn exact_title_match_never_ranks_lower() {
    let query = ctx("water treatment");
    for prior in [0.3f32, 0.5, 0.9] {
        let plain = project("Plant Upgrade", "Tucson, AZ");
        let titled = project("Water Plant Upgrade", "Tucson, AZ");
        let ranked = rerank(
            vec![ScoredResult::new(plain, CollectionKind::Projects, prior), ScoredResult::new(titled, CollectionKind::Projects, prior)],
            &query,
            0.1,
        );
        assert_eq!(ranked[0].document.title, "Water Plant Upgrade");
    }
}

#[test]
fn equal_scores_keep_incoming_order() {
    let query = ctx("hospital");
    let ranked = rerank(
        vec![
            ScoredResult::new(project("First", "X"), CollectionKind::Projects, 0.5),
            ScoredResult::new(project("Second", "Y"), CollectionKind::Projects, 0.5),
        ],
        &query,
        0.1,
    );
    assert_eq!(titles(&ranked), vec!["First", "Second"]);
}

#[test]
fn value_and_award_type_bonuses() {
    let mut valued = project("Terminal", "Phoenix, AZ");
    valued.construction_value = Some("$120 million".into());
    assert!((rerank_boost(&valued, CollectionKind::Projects, &ctx("largest budget")) - 3.0).abs() < 1e-6);

    let mut safety = award("Safety Excellence", "AGC", "2021");
    safety.category = Some("Safety".into());
    let boost = rerank_boost(&safety, CollectionKind::Awards, &ctx("safety recognition"));
    assert!((boost - (3.0 + 2.0 + 3.0)).abs() < 1e-6, "{boost}");
}
