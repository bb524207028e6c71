use std::path::{Path, PathBuf};
use std::time::Instant;

use sitedb_core::error::{Error, Result};
use sitedb_core::traits::Embedder;
use sitedb_core::types::{CollectionKind, Document, Field};
use tracing::{debug, info, warn};

use crate::cache::{read_snapshot, write_snapshot};
use crate::search::l2_normalize;
use crate::snapshot::{Fingerprint, Snapshot};

/// Text a document is embedded from: labeled fields in a fixed order,
/// blank fields skipped, one per line.
pub fn embedding_text(doc: &Document, kind: CollectionKind) -> String {
    let parts = match kind {
        CollectionKind::Projects => vec![
            ("Title", doc.text(Field::Title)),
            ("Description", doc.summary()),
            ("Location", doc.text(Field::Location)),
            ("Client", doc.text(Field::Client)),
            ("Features", doc.text(Field::Features)),
            ("Specialties", doc.text(Field::Specialties)),
        ],
        CollectionKind::Awards => vec![
            ("Title", doc.text(Field::Title)),
            ("Organization", doc.text(Field::Organization)),
            ("Category", doc.text(Field::Category)),
            ("Description", doc.text(Field::Description)),
            ("Year", doc.when()),
            ("Projects", doc.text(Field::RelatedProjects)),
        ],
    };
    parts
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label}: {}", v.trim())))
        .collect::<Vec<_>>()
        .join("\n")
}

struct EmbeddingTexts {
    projects: Vec<String>,
    awards: Vec<String>,
}

impl EmbeddingTexts {
    fn new(projects: &[Document], awards: &[Document]) -> Self {
        Self {
            projects: projects.iter().map(|d| embedding_text(d, CollectionKind::Projects)).collect(),
            awards: awards.iter().map(|d| embedding_text(d, CollectionKind::Awards)).collect(),
        }
    }

    fn fingerprint(&self) -> Fingerprint { Fingerprint::compute(&self.projects, &self.awards) }
}

/// Loads, regenerates and persists the embedding snapshot backing vector search.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    cache_path: PathBuf,
}

impl EmbeddingStore {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self { Self { cache_path: cache_path.into() } }

    pub fn cache_path(&self) -> &Path { &self.cache_path }

    /// Snapshot for the given collections. Never fails: a missing embedder
    /// or a failed generation yields a degraded snapshot, a corrupt or stale
    /// cache is regenerated.
    pub fn load(
        &self,
        projects: &[Document],
        awards: &[Document],
        embedder: Option<&dyn Embedder>,
        use_cached: bool,
    ) -> Snapshot {
        let texts = EmbeddingTexts::new(projects, awards);
        let fingerprint = texts.fingerprint();
        if use_cached {
            match read_snapshot(&self.cache_path) {
                Ok(Some(snapshot)) => match &snapshot.fingerprint {
                    Some(stored) if *stored != fingerprint => {
                        warn!(
                            path = %self.cache_path.display(),
                            cached_projects = stored.project_count,
                            cached_awards = stored.award_count,
                            "embedding cache is stale, regenerating"
                        );
                    }
                    Some(_) => {
                        info!(path = %self.cache_path.display(), "loaded embedding cache");
                        return snapshot;
                    }
                    None => {
                        info!(path = %self.cache_path.display(), "loaded embedding cache without fingerprint");
                        return snapshot;
                    }
                },
                Ok(None) => debug!(path = %self.cache_path.display(), "no embedding cache"),
                Err(e) => warn!(path = %self.cache_path.display(), error = %e, "embedding cache unreadable, regenerating"),
            }
        }
        let Some(embedder) = embedder else {
            warn!("embedding capability unavailable; vector search disabled");
            return Snapshot::unavailable();
        };
        match self.generate(&texts, fingerprint, embedder) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "embedding generation failed; vector search disabled");
                Snapshot::unavailable()
            }
        }
    }

    /// Regenerate every vector from scratch, ignoring any cache.
    pub fn rebuild(&self, projects: &[Document], awards: &[Document], embedder: &dyn Embedder) -> Result<Snapshot> {
        let texts = EmbeddingTexts::new(projects, awards);
        let fingerprint = texts.fingerprint();
        self.generate(&texts, fingerprint, embedder)
    }

    fn generate(&self, texts: &EmbeddingTexts, fingerprint: Fingerprint, embedder: &dyn Embedder) -> Result<Snapshot> {
        let start = Instant::now();
        let projects = encode(embedder, CollectionKind::Projects, &texts.projects)?;
        let awards = encode(embedder, CollectionKind::Awards, &texts.awards)?;
        let snapshot = Snapshot::new(projects, awards).with_fingerprint(fingerprint);
        if let Err(e) = write_snapshot(&self.cache_path, &snapshot) {
            warn!(path = %self.cache_path.display(), error = %e, "could not persist embedding cache");
        }
        info!(
            projects = snapshot.projects.len(),
            awards = snapshot.awards.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generated embeddings"
        );
        Ok(snapshot)
    }
}

fn encode(embedder: &dyn Embedder, kind: CollectionKind, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() { return Ok(Vec::new()); }
    let mut vectors = embedder.embed_batch(texts).map_err(|e| Error::Embedding(format!("{kind}: {e:#}")))?;
    if vectors.len() != texts.len() {
        return Err(Error::LengthMismatch { kind, documents: texts.len(), vectors: vectors.len() });
    }
    for v in &mut vectors { l2_normalize(v); }
    Ok(vectors)
}
