//! Domain types shared by the retrieval pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The two corpora the engine answers questions over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Projects,
    Awards,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] = [CollectionKind::Projects, CollectionKind::Awards];

    /// Key used in collection files and response payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Projects => "projects",
            CollectionKind::Awards => "awards",
        }
    }

    /// Header used for one record in assembled context (`PROJECT 1:`).
    pub fn record_label(&self) -> &'static str {
        match self {
            CollectionKind::Projects => "PROJECT",
            CollectionKind::Awards => "AWARD",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for CollectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" | "projects" => Ok(CollectionKind::Projects),
            "award" | "awards" => Ok(CollectionKind::Awards),
            other => Err(Error::InvalidConfig(format!("unknown collection '{other}'"))),
        }
    }
}

/// Known document fields. Scoring code addresses documents through this enum
/// instead of string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Overview,
    Location,
    Client,
    Value,
    ConstructionValue,
    DeliveryMethod,
    Features,
    Specialties,
    Organization,
    Category,
    AwardType,
    Date,
    Year,
    RelatedProjects,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Overview => "Overview",
            Field::Location => "Location",
            Field::Client => "Client",
            Field::Value => "Value",
            Field::ConstructionValue => "Construction Value",
            Field::DeliveryMethod => "Delivery Method",
            Field::Features => "Features",
            Field::Specialties => "Specialties",
            Field::Organization => "Organization",
            Field::Category => "Category",
            Field::AwardType => "Award Type",
            Field::Date => "Date",
            Field::Year => "Year",
            Field::RelatedProjects => "Related Projects",
        }
    }
}

/// Reference from an award to a project it was given for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default, deserialize_with = "de::string")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One project or award record.
///
/// Known fields are typed; anything else in the source record lands in
/// `extra` so schema drift does not fail the load. `index` is the position in
/// the owning collection and is assigned by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(skip)]
    pub index: usize,
    #[serde(default, deserialize_with = "de::string")]
    pub title: String,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub construction_value: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<String>,
    #[serde(default, deserialize_with = "de::string_list", skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "de::string_list", skip_serializing_if = "Vec::is_empty")]
    pub specialties: Vec<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub award_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "de::project_refs", skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Document {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Text of a field, or `None` when the field is absent or blank.
    /// List fields are joined with `", "`.
    pub fn text(&self, field: Field) -> Option<Cow<'_, str>> {
        let value: Cow<'_, str> = match field {
            Field::Title => Cow::Borrowed(self.title.as_str()),
            Field::Description => Cow::Borrowed(self.description.as_deref()?),
            Field::Overview => Cow::Borrowed(self.overview.as_deref()?),
            Field::Location => Cow::Borrowed(self.location.as_deref()?),
            Field::Client => Cow::Borrowed(self.client.as_deref()?),
            Field::Value => Cow::Borrowed(self.value.as_deref()?),
            Field::ConstructionValue => Cow::Borrowed(self.construction_value.as_deref()?),
            Field::DeliveryMethod => Cow::Borrowed(self.delivery_method.as_deref()?),
            Field::Features => Cow::Owned(self.features.join(", ")),
            Field::Specialties => Cow::Owned(self.specialties.join(", ")),
            Field::Organization => Cow::Borrowed(self.organization.as_deref()?),
            Field::Category => Cow::Borrowed(self.category.as_deref()?),
            Field::AwardType => Cow::Borrowed(self.award_type.as_deref()?),
            Field::Date => Cow::Borrowed(self.date.as_deref()?),
            Field::Year => Cow::Borrowed(self.year.as_deref()?),
            Field::RelatedProjects => Cow::Owned(
                self.projects
                    .iter()
                    .map(|p| p.title.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        };
        if value.trim().is_empty() { None } else { Some(value) }
    }

    /// Description, falling back to the overview some project pages carry instead.
    pub fn summary(&self) -> Option<Cow<'_, str>> {
        self.text(Field::Description).or_else(|| self.text(Field::Overview))
    }

    /// Year, falling back to the full date.
    pub fn when(&self) -> Option<Cow<'_, str>> {
        self.text(Field::Year).or_else(|| self.text(Field::Date))
    }
}

/// A document copy carrying per-request scores.
///
/// Serializes flat, like the source records, with `_score`/`_rank` appended.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub document: Document,
    #[serde(skip)]
    pub kind: CollectionKind,
    #[serde(rename = "_score")]
    pub score: f32,
    #[serde(rename = "_vector_score")]
    pub vector_score: f32,
    #[serde(rename = "_rank")]
    pub rank: usize,
    #[serde(rename = "_keyword_matches", skip_serializing_if = "Option::is_none")]
    pub keyword_matches: Option<u32>,
    #[serde(rename = "_boost", skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

impl ScoredResult {
    pub fn new(document: Document, kind: CollectionKind, vector_score: f32) -> Self {
        Self { document, kind, score: vector_score, vector_score, rank: 0, keyword_matches: None, boost: None }
    }
}

/// Stable descending sort by score; equal scores keep their incoming order.
pub fn sort_by_score(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

mod de {
    use super::{Deserialize, Deserializer, ProjectRef};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Scalar::Str(s) => s,
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Bool(b) => b.to_string(),
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Scalar>),
        One(Scalar),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RefRepr {
        Title(String),
        Full(ProjectRef),
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<Scalar>::deserialize(d)?;
        Ok(value.map(Scalar::into_string).filter(|s| !s.trim().is_empty()))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        opt_string(d).map(Option::unwrap_or_default)
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items = match Option::<OneOrMany>::deserialize(d)? {
            None => Vec::new(),
            Some(OneOrMany::One(s)) => vec![s.into_string()],
            Some(OneOrMany::Many(v)) => v.into_iter().map(Scalar::into_string).collect(),
        };
        Ok(items.into_iter().filter(|s| !s.trim().is_empty()).collect())
    }

    pub fn project_refs<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ProjectRef>, D::Error> {
        let items = Option::<Vec<RefRepr>>::deserialize(d)?.unwrap_or_default();
        Ok(items
            .into_iter()
            .map(|r| match r {
                RefRepr::Title(title) => ProjectRef { title, url: None },
                RefRepr::Full(p) => p,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerant_field_shapes() {
        let json = r#"{
            "title": "Gateway Bridge",
            "year": 2022,
            "features": "Design-Build",
            "specialties": ["Bridges", ""],
            "projects": ["Loop 202", {"title": "I-10 Widening", "url": "https://example.com"}],
            "square_feet": 12000
        }"#;
        let doc: Document = serde_json::from_str(json).expect("parse");
        assert_eq!(doc.year.as_deref(), Some("2022"));
        assert_eq!(doc.features, vec!["Design-Build".to_string()]);
        assert_eq!(doc.specialties, vec!["Bridges".to_string()]);
        assert_eq!(doc.projects.len(), 2);
        assert_eq!(doc.text(Field::RelatedProjects).as_deref(), Some("Loop 202, I-10 Widening"));
        assert_eq!(doc.extra.get("square_feet"), Some(&serde_json::json!(12000)));
    }

    #[test]
    fn blank_fields_read_as_absent() {
        let doc: Document = serde_json::from_str(r#"{"title": "X", "location": "  ", "client": null}"#).expect("parse");
        assert!(doc.text(Field::Location).is_none());
        assert!(doc.text(Field::Client).is_none());
        assert!(doc.text(Field::Features).is_none());
    }

    #[test]
    fn summary_and_when_fallbacks() {
        let doc = Document { overview: Some("Overview text".into()), date: Some("May 2021".into()), ..Document::titled("T") };
        assert_eq!(doc.summary().as_deref(), Some("Overview text"));
        assert_eq!(doc.when().as_deref(), Some("May 2021"));
    }

    #[test]
    fn collection_kind_parse() {
        assert_eq!("Projects".parse::<CollectionKind>().ok(), Some(CollectionKind::Projects));
        assert_eq!("award".parse::<CollectionKind>().ok(), Some(CollectionKind::Awards));
        assert!("people".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut results: Vec<ScoredResult> = ["a", "b", "c"]
            .iter()
            .map(|t| ScoredResult::new(Document::titled(*t), CollectionKind::Projects, 0.5))
            .collect();
        results[2].score = 0.9;
        sort_by_score(&mut results);
        let titles: Vec<&str> = results.iter().map(|r| r.document.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }
}
