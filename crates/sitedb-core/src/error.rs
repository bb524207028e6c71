use std::time::Duration;

use thiserror::Error;

use crate::types::CollectionKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("{kind} collection has {documents} documents but {vectors} vectors")]
    LengthMismatch { kind: CollectionKind, documents: usize, vectors: usize },

    #[error("query vector has dimension {query} but {kind} vectors have dimension {stored}")]
    DimensionMismatch { kind: CollectionKind, query: usize, stored: usize },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Generation failed after {attempts} attempts: {message}")]
    Generation { attempts: u32, message: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
