//! Collection loader for the `projects.json` / `awards.json` files written by
//! the crawlers. Each file is an object holding one array under the
//! collection key: `{"projects": [...]}`.

use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::types::{CollectionKind, Document};

/// Strict load: any read or parse failure is an error. A file without the
/// collection key yields an empty collection.
pub fn try_load_collection(path: &Path, kind: CollectionKind) -> anyhow::Result<Vec<Document>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut root: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let items = match root.get_mut(kind.as_str()) {
        Some(v) => v.take(),
        None => return Ok(Vec::new()),
    };
    let mut documents: Vec<Document> = serde_json::from_value(items)
        .with_context(|| format!("decoding {} records in {}", kind, path.display()))?;
    for (i, doc) in documents.iter_mut().enumerate() {
        doc.index = i;
    }
    Ok(documents)
}

/// Lenient load used at startup: a missing or corrupt file degrades to an
/// empty collection and a warning.
pub fn load_collection(path: &Path, kind: CollectionKind) -> Vec<Document> {
    if !path.exists() {
        warn!(path = %path.display(), %kind, "collection file does not exist");
        return Vec::new();
    }
    match try_load_collection(path, kind) {
        Ok(documents) => {
            info!(path = %path.display(), %kind, count = documents.len(), "loaded collection");
            documents
        }
        Err(e) => {
            warn!(path = %path.display(), %kind, error = %format!("{e:#}"), "failed to load collection");
            Vec::new()
        }
    }
}
