use sitedb_core::types::{CollectionKind, Document, ScoredResult};
use sitedb_hybrid::context::{estimate_tokens, full_block, CONDENSED_CANDIDATES};
use sitedb_hybrid::ContextAssembler;

fn result(title: &str, description: &str, score: f32) -> ScoredResult {
    let mut doc = Document::titled(title);
    doc.description = Some(description.into());
    doc.location = Some("Tucson, AZ".into());
    ScoredResult::new(doc, CollectionKind::Projects, score)
}

fn headers(text: &str) -> usize { text.lines().filter(|l| l.starts_with("PROJECT ")).count() }

fn block_tokens(text: &str) -> usize { text.split("\n\n").map(estimate_tokens).sum() }

#[test]
fn empty_input_gives_empty_context() {
    assert_eq!(ContextAssembler::default().assemble(&[]), "");
}

#[test]
fn blocks_follow_score_order() {
    let results = vec![result("Low", "Short.", 0.2), result("High", "Short.", 0.9)];
    let text = ContextAssembler::new(3500).assemble(&results);
    assert!(text.starts_with("PROJECT 1:\nTitle: High"));
    assert!(text.contains("\n\nPROJECT 2:\nTitle: Low"));
}

#[test]
fn stays_within_budget() {
    let long = "Concrete and steel. ".repeat(30);
    let results: Vec<_> = (0..20).map(|i| result(&format!("Project {i}"), &long, 1.0 - i as f32 * 0.01)).collect();
    for budget in [50, 200, 800, 3500] {
        let text = ContextAssembler::new(budget).assemble(&results);
        assert!(!text.is_empty());
        assert!(block_tokens(&text) <= budget, "budget {budget} got {}", block_tokens(&text));
    }
}

#[test]
fn oversized_top_results_are_condensed() {
    let long = format!("First sentence here. {}", "More detail. ".repeat(400));
    let results: Vec<_> = (0..6).map(|i| result(&format!("Big {i}"), &long, 1.0 - i as f32 * 0.1)).collect();
    let text = ContextAssembler::new(200).assemble(&results);
    assert!(text.contains("Summary: First sentence here."));
    assert!(!text.contains("More detail."));
    assert!(headers(&text) <= CONDENSED_CANDIDATES);
    assert!(block_tokens(&text) <= 200);
}

#[test]
fn tiny_budget_still_returns_top_result() {
    let results = vec![result("Second", "B.", 0.4), result("Top", "A long description. With two sentences.", 0.8)];
    let text = ContextAssembler::new(1).assemble(&results);
    assert!(text.starts_with("PROJECT 1:\nTitle: Top"));
    assert!(text.contains("Summary: A long description."));
    assert_eq!(headers(&text), 1);
}

#[test]
fn budget_sums_per_block_estimates_without_separators() {
    let results = vec![result("Alpha", "Gravel road.", 0.9), result("Beta", "Steel truss.", 0.8)];
    let first = full_block(&results[0], 1);
    let second = full_block(&results[1], 2);
    let budget = estimate_tokens(&first) + estimate_tokens(&second);
    let text = ContextAssembler::new(budget).assemble(&results);
    assert_eq!(text, format!("{first}\n\n{second}"));

    let tighter = ContextAssembler::new(budget - 1).assemble(&results);
    assert!(tighter.starts_with(&first));
    assert!(!tighter.contains(&second));
}
