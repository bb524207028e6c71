//! Persisted snapshot file. Writes go to a temp file in the target
//! directory and are renamed over the old cache, so readers see either the
//! previous file or the complete new one.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use sitedb_core::error::{Error, Result};
use sitedb_core::types::CollectionKind;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::snapshot::Snapshot;

/// `Ok(None)` when no cache exists; an error when it exists but is unusable.
pub fn read_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() { return Ok(None); }
    let file = fs::File::open(path)?;
    let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
    validate(&snapshot)?;
    debug!(path = %path.display(), projects = snapshot.projects.len(), awards = snapshot.awards.len(), "read embedding cache");
    Ok(Some(snapshot))
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, snapshot)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    debug!(path = %path.display(), "wrote embedding cache");
    Ok(())
}

fn validate(snapshot: &Snapshot) -> Result<()> {
    let dim = snapshot.dim();
    for kind in CollectionKind::ALL {
        for (i, v) in snapshot.vectors(kind).iter().enumerate() {
            if Some(v.len()) != dim || v.is_empty() {
                return Err(Error::Operation(format!("{kind} vector {i} has dimension {} (expected {dim:?})", v.len())));
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(Error::Operation(format!("{kind} vector {i} has non-finite values")));
            }
        }
    }
    Ok(())
}
