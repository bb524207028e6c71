use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::CollectionKind;

/// Text embedding capability.
///
/// Implementations return one vector of length `dim()` per input text, in
/// input order. Output for identical input must be deterministic.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Everything the generation step needs for one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: CollectionKind,
    pub query: String,
    pub context: String,
}

/// Text generation capability. Treated as opaque and possibly transiently
/// failing; callers wrap it in a retry policy.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}
