//! sitedb-vector
//!
//! Embedding store and dense retrieval: per-collection vectors held in an
//! immutable [`Snapshot`], persisted as one JSON cache file with an
//! integrity fingerprint, and searched by cosine similarity.

pub mod cache;
pub mod search;
pub mod snapshot;
pub mod store;

pub use search::{l2_normalize, search};
pub use snapshot::{Fingerprint, Snapshot};
pub use store::{embedding_text, EmbeddingStore};
