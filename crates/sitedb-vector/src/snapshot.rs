use serde::{Deserialize, Serialize};

use sitedb_core::error::{Error, Result};
use sitedb_core::types::CollectionKind;

/// Identifies the collections a snapshot was built from: document counts
/// plus a blake3 hash over every embedding text, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub project_count: usize,
    pub award_count: usize,
    pub source_hash: String,
}

impl Fingerprint {
    pub fn compute(projects: &[String], awards: &[String]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (label, texts) in [("projects", projects), ("awards", awards)] {
            hasher.update(label.as_bytes());
            hasher.update(&(texts.len() as u64).to_le_bytes());
            for text in texts {
                hasher.update(&(text.len() as u64).to_le_bytes());
                hasher.update(text.as_bytes());
            }
        }
        Self {
            project_count: projects.len(),
            award_count: awards.len(),
            source_hash: hasher.finalize().to_hex().to_string(),
        }
    }
}

/// Vectors for both collections, index-aligned with their documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Vec<f32>>,
    #[serde(default)]
    pub awards: Vec<Vec<f32>>,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    #[serde(skip)]
    degraded: bool,
}

impl Snapshot {
    pub fn new(projects: Vec<Vec<f32>>, awards: Vec<Vec<f32>>) -> Self {
        Self { projects, awards, created_at: now_secs(), fingerprint: None, degraded: false }
    }

    /// Empty snapshot standing in for an unavailable embedding capability.
    pub fn unavailable() -> Self {
        Self { created_at: now_secs(), degraded: true, ..Self::default() }
    }

    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn is_degraded(&self) -> bool { self.degraded }

    pub fn vectors(&self, kind: CollectionKind) -> &[Vec<f32>] {
        match kind {
            CollectionKind::Projects => &self.projects,
            CollectionKind::Awards => &self.awards,
        }
    }

    /// Common vector dimension, `None` when the snapshot holds no vectors.
    pub fn dim(&self) -> Option<usize> {
        self.projects.first().or_else(|| self.awards.first()).map(Vec::len)
    }

    /// Fails when `kind` holds a different number of vectors than documents.
    /// A degraded snapshot is aligned with anything.
    pub fn ensure_aligned(&self, kind: CollectionKind, documents: usize) -> Result<()> {
        let vectors = self.vectors(kind).len();
        if self.degraded || vectors == documents { return Ok(()); }
        Err(Error::LengthMismatch { kind, documents, vectors })
    }
}

pub(crate) fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
