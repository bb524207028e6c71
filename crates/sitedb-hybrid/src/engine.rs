use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sitedb_core::config::{RetrievalSettings, Settings};
use sitedb_core::error::{Error, Result};
use sitedb_core::loader::load_collection;
use sitedb_core::traits::Embedder;
use sitedb_core::types::{CollectionKind, Document, ScoredResult};
use sitedb_text::{KeywordAnalyzer, QueryContext};
use sitedb_vector::search::ensure_dim;
use sitedb_vector::{l2_normalize, EmbeddingStore, Snapshot};

use crate::collection::Collection;
use crate::hybrid::{apply_keyword_boost, vector_candidates};
use crate::rerank::rerank;

/// Everything one query reads, published as a unit.
#[derive(Debug)]
pub struct EngineState {
    pub projects: Arc<Collection>,
    pub awards: Arc<Collection>,
    pub snapshot: Arc<Snapshot>,
}

impl EngineState {
    pub fn collection(&self, kind: CollectionKind) -> &Arc<Collection> {
        match kind {
            CollectionKind::Projects => &self.projects,
            CollectionKind::Awards => &self.awards,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Projects,
    Awards,
    #[default]
    All,
}

impl SearchScope {
    pub fn includes(&self, kind: CollectionKind) -> bool {
        matches!(
            (self, kind),
            (SearchScope::All, _) | (SearchScope::Projects, CollectionKind::Projects) | (SearchScope::Awards, CollectionKind::Awards)
        )
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchScope::Projects => "projects",
            SearchScope::Awards => "awards",
            SearchScope::All => "all",
        })
    }
}

impl FromStr for SearchScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SearchScope::All),
            other => other.parse::<CollectionKind>().map(|kind| match kind {
                CollectionKind::Projects => SearchScope::Projects,
                CollectionKind::Awards => SearchScope::Awards,
            }),
        }
    }
}

/// Results of [`RetrievalEngine::search_all`]. Collections outside the
/// scope are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(rename = "type")]
    pub scope: SearchScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ScoredResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<Vec<ScoredResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_count: Option<usize>,
    /// Seconds.
    pub execution_time: f64,
}

/// Hybrid retrieval over both collections. Shared across callers; reads
/// take a snapshot of the published state, rebuilds swap in a new one.
pub struct RetrievalEngine {
    state: RwLock<Arc<EngineState>>,
    rebuild_lock: Mutex<()>,
    embedder: Option<Arc<dyn Embedder>>,
    store: EmbeddingStore,
    analyzer: KeywordAnalyzer,
    retrieval: RetrievalSettings,
    use_cached_embeddings: bool,
}

impl RetrievalEngine {
    pub fn new(
        projects: Vec<Document>,
        awards: Vec<Document>,
        embedder: Option<Arc<dyn Embedder>>,
        store: EmbeddingStore,
        settings: &Settings,
    ) -> Self {
        let use_cached_embeddings = settings.data.use_cached_embeddings;
        let snapshot = store.load(&projects, &awards, embedder.as_deref(), use_cached_embeddings);
        let state = EngineState {
            projects: Arc::new(Collection::new(CollectionKind::Projects, projects)),
            awards: Arc::new(Collection::new(CollectionKind::Awards, awards)),
            snapshot: Arc::new(snapshot),
        };
        info!(
            projects = state.projects.len(),
            awards = state.awards.len(),
            vector_search = !state.snapshot.is_degraded(),
            "retrieval engine ready"
        );
        Self {
            state: RwLock::new(Arc::new(state)),
            rebuild_lock: Mutex::new(()),
            embedder,
            store,
            analyzer: KeywordAnalyzer::new(),
            retrieval: settings.retrieval.clone(),
            use_cached_embeddings,
        }
    }

    /// Loads both collections and the embedding cache from `settings.data`.
    pub fn from_settings(settings: &Settings, embedder: Option<Arc<dyn Embedder>>) -> Self {
        let data = &settings.data;
        let projects = load_collection(&data.projects_path(), CollectionKind::Projects);
        let awards = load_collection(&data.awards_path(), CollectionKind::Awards);
        Self::new(projects, awards, embedder, EmbeddingStore::new(data.embeddings_path()), settings)
    }

    pub fn state(&self) -> Arc<EngineState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn count(&self, kind: CollectionKind) -> usize { self.state().collection(kind).len() }
    pub fn project_count(&self) -> usize { self.count(CollectionKind::Projects) }
    pub fn award_count(&self) -> usize { self.count(CollectionKind::Awards) }

    /// Documents of one collection in load order, optionally capped.
    pub fn documents(&self, kind: CollectionKind, limit: Option<usize>) -> Vec<Document> {
        let state = self.state();
        let docs = state.collection(kind).documents();
        docs.iter().take(limit.unwrap_or(docs.len())).cloned().collect()
    }

    /// Vector candidates merged with the keyword boost, best first.
    pub fn hybrid_search(&self, kind: CollectionKind, query: &str, limit: usize) -> Result<Vec<ScoredResult>> {
        let state = self.state();
        let ctx = QueryContext::parse(query, &self.analyzer);
        self.hybrid_in(&state, kind, &ctx, limit)
    }

    /// Full ranking for one collection: hybrid merge from the candidate pool,
    /// re-rank, truncate to `limit` and number the results from 1.
    pub fn search(&self, kind: CollectionKind, query: &str, limit: usize) -> Result<Vec<ScoredResult>> {
        let state = self.state();
        let ctx = QueryContext::parse(query, &self.analyzer);
        let candidates = self.hybrid_in(&state, kind, &ctx, limit.max(self.retrieval.candidate_limit))?;
        let mut ranked = rerank(candidates, &ctx, self.retrieval.rerank_boost_scale);
        ranked.truncate(limit);
        for (i, result) in ranked.iter_mut().enumerate() { result.rank = i + 1; }
        debug!(%kind, query, results = ranked.len(), "search complete");
        Ok(ranked)
    }

    pub fn search_all(&self, query: &str, scope: SearchScope, limit: usize) -> Result<SearchResponse> {
        let start = Instant::now();
        let mut response = SearchResponse {
            query: query.to_string(),
            scope,
            projects: None,
            project_count: None,
            awards: None,
            award_count: None,
            execution_time: 0.0,
        };
        if scope.includes(CollectionKind::Projects) {
            let projects = self.search(CollectionKind::Projects, query, limit)?;
            response.project_count = Some(projects.len());
            response.projects = Some(projects);
        }
        if scope.includes(CollectionKind::Awards) {
            let awards = self.search(CollectionKind::Awards, query, limit)?;
            response.award_count = Some(awards.len());
            response.awards = Some(awards);
        }
        response.execution_time = start.elapsed().as_secs_f64();
        Ok(response)
    }

    fn hybrid_in(&self, state: &EngineState, kind: CollectionKind, ctx: &QueryContext, limit: usize) -> Result<Vec<ScoredResult>> {
        let collection = state.collection(kind);
        state.snapshot.ensure_aligned(kind, collection.len())?;
        let vectors = state.snapshot.vectors(kind);
        if collection.is_empty() || vectors.is_empty() || ctx.raw.is_empty() { return Ok(Vec::new()); }
        let Some(query_vector) = self.embed_query(&ctx.raw) else { return Ok(Vec::new()) };
        ensure_dim(kind, &query_vector, vectors)?;

        let candidate_limit = limit.max(self.retrieval.candidate_limit);
        let mut candidates = vector_candidates(collection, vectors, &query_vector, self.retrieval.threshold, candidate_limit);
        if ctx.keywords.is_empty() || candidates.is_empty() {
            candidates.truncate(limit);
            return Ok(candidates);
        }
        let term_frequencies = collection.term_frequencies(&self.analyzer);
        Ok(apply_keyword_boost(candidates, &ctx.keywords, &term_frequencies, self.retrieval.hybrid_boost_scale, limit))
    }

    fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_deref()?;
        match embedder.embed_batch(&[query.to_string()]) {
            Ok(mut vectors) if !vectors.is_empty() => {
                let mut v = vectors.swap_remove(0);
                l2_normalize(&mut v);
                Some(v)
            }
            Ok(_) => {
                warn!("embedder returned no vector for the query");
                None
            }
            Err(e) => {
                warn!(error = %e, "query embedding failed; returning no results");
                None
            }
        }
    }

    /// Regenerates every vector for the current collections and publishes
    /// the new snapshot. Readers keep the old one until the swap.
    pub fn rebuild(&self) -> Result<()> {
        let _guard = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let embedder = self.embedder.as_deref().ok_or_else(|| Error::Embedding("no embedding capability configured".into()))?;
        let current = self.state();
        let snapshot = self.store.rebuild(current.projects.documents(), current.awards.documents(), embedder)?;
        self.publish(EngineState {
            projects: Arc::clone(&current.projects),
            awards: Arc::clone(&current.awards),
            snapshot: Arc::new(snapshot),
        });
        Ok(())
    }

    /// Replaces both collections. With `regenerate` the vectors are rebuilt
    /// from scratch; otherwise the cache is used when it still matches.
    pub fn reload(&self, projects: Vec<Document>, awards: Vec<Document>, regenerate: bool) -> Result<()> {
        let _guard = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let embedder = self.embedder.as_deref();
        let snapshot = match embedder {
            Some(embedder) if regenerate => self.store.rebuild(&projects, &awards, embedder)?,
            _ => self.store.load(&projects, &awards, embedder, self.use_cached_embeddings && !regenerate),
        };
        self.publish(EngineState {
            projects: Arc::new(Collection::new(CollectionKind::Projects, projects)),
            awards: Arc::new(Collection::new(CollectionKind::Awards, awards)),
            snapshot: Arc::new(snapshot),
        });
        Ok(())
    }

    fn publish(&self, state: EngineState) {
        info!(projects = state.projects.len(), awards = state.awards.len(), "publishing engine state");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(state);
    }
}
