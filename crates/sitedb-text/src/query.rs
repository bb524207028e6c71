//! Query pattern detection used by the re-ranker.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::KeywordAnalyzer;
use crate::matching::{contains_phrase, contains_word};

static YEAR_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").ok());
static LOCATION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Ii]n|[Aa]t|[Nn]ear|[Aa]round|[Ff]rom|[Ww]ithin)\s+([A-Z][\w'.-]*(?:\s+[A-Z][\w'.-]*)*)").ok()
});

/// An organization known by its acronym, with full names that also count as a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Organization {
    pub acronym: &'static str,
    pub names: &'static [&'static str],
}

impl Organization {
    pub fn mentioned_in(&self, text: &str) -> bool {
        contains_word(text, self.acronym) || self.names.iter().any(|n| contains_phrase(text, n))
    }
}

pub const KNOWN_ORGANIZATIONS: &[Organization] = &[
    Organization { acronym: "ENR", names: &["engineering news-record", "engineering news record"] },
    Organization { acronym: "AGC", names: &["associated general contractors"] },
    Organization { acronym: "ABC", names: &["associated builders and contractors"] },
    Organization { acronym: "DBIA", names: &["design-build institute of america", "design build institute"] },
    Organization { acronym: "ASCE", names: &["american society of civil engineers"] },
    Organization { acronym: "ACEC", names: &["american council of engineering companies"] },
    Organization { acronym: "CMAA", names: &["construction management association of america"] },
    Organization { acronym: "AIA", names: &["american institute of architects"] },
    Organization { acronym: "NSC", names: &["national safety council"] },
    Organization { acronym: "OSHA", names: &["occupational safety and health administration"] },
    Organization { acronym: "USGBC", names: &["green building council"] },
    Organization { acronym: "APWA", names: &["american public works association"] },
    Organization { acronym: "ARTBA", names: &["american road and transportation builders"] },
    Organization { acronym: "ULI", names: &["urban land institute"] },
];

/// Award-type vocabulary. The generic word "award" is deliberately absent.
pub const AWARD_TERMS: &[&str] = &[
    "safety", "excellence", "quality", "innovation", "innovative", "environmental", "sustainability",
    "craftsmanship", "partnering", "partnership", "community", "build america", "best project",
    "project of the year", "marvin m black", "pinnacle", "eagle", "diamond", "merit", "honor",
];

pub const VALUE_TERMS: &[&str] = &[
    "value", "cost", "costs", "budget", "price", "dollar", "dollars", "million", "billion", "expensive",
    "largest", "biggest", "worth",
];

/// Everything the ranking stages need to know about one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    pub raw: String,
    pub keywords: Vec<String>,
    pub year: Option<String>,
    pub organizations: Vec<Organization>,
    pub location: Option<String>,
    pub award_terms: Vec<&'static str>,
    pub value_focus: bool,
}

impl QueryContext {
    pub fn parse(query: &str, analyzer: &KeywordAnalyzer) -> Self {
        let raw = query.trim().to_string();
        let keywords = analyzer.keywords(&raw);
        let year = YEAR_RE.as_ref().and_then(|re| re.find(&raw)).map(|m| m.as_str().to_string());
        let organizations = KNOWN_ORGANIZATIONS.iter().copied().filter(|o| o.mentioned_in(&raw)).collect();
        let location = LOCATION_RE
            .as_ref()
            .and_then(|re| re.captures(&raw))
            .and_then(|c| c.get(1))
            .and_then(|m| place_name(m.as_str()));
        let award_terms = AWARD_TERMS.iter().copied().filter(|t| contains_phrase(&raw, t)).collect();
        let value_focus = raw.contains('$') || VALUE_TERMS.iter().any(|t| contains_word(&raw, t));
        Self { raw, keywords, year, organizations, location, award_terms, value_focus }
    }

    pub fn has_patterns(&self) -> bool {
        self.year.is_some()
            || !self.organizations.is_empty()
            || self.location.is_some()
            || !self.award_terms.is_empty()
            || self.value_focus
    }
}

/// The captured place up to the first organization mention, so
/// "San Antonio ENR" yields "San Antonio".
fn place_name(captured: &str) -> Option<String> {
    let words: Vec<&str> = captured.split_whitespace().collect();
    let end = (0..words.len()).find(|&i| starts_with_organization(&words[i..])).unwrap_or(words.len());
    let place = words[..end].join(" ");
    let place = place.trim_end_matches(['.', '-', '\'']);
    (!place.is_empty()).then(|| place.to_string())
}

fn starts_with_organization(words: &[&str]) -> bool {
    let Some(first) = words.first() else { return false };
    let first = first.trim_matches(|c: char| !c.is_alphanumeric());
    let rest = words.join(" ").to_lowercase();
    KNOWN_ORGANIZATIONS.iter().any(|o| first == o.acronym || o.names.iter().any(|n| rest.starts_with(n)))
}
