//! JSON persistence for `Index`.
//!
//! Writes go to a temp file in the target directory and are renamed into
//! place, so readers see either the previous index or the new one in full.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

use discovery_core::{Error, Result};

use crate::index::Index;

pub fn save(index: &Index, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_vec_pretty(index).map_err(io::Error::from)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), documents = index.len(), bytes = json.len(), "index saved");
    Ok(())
}

/// Read an index written by `save`.
///
/// A missing file is `IndexNotFound`; anything unparsable, lacking one of the
/// top-level fields, or from another major format version is `IndexCorrupt`.
pub fn load(path: &Path) -> Result<Index> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::IndexNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(Error::IndexCorrupt(format!("cannot read {}: {}", path.display(), e)))
        }
    };
    let index: Index = serde_json::from_slice(&raw)
        .map_err(|e| Error::IndexCorrupt(format!("{}: {}", path.display(), e)))?;
    index.check_version()?;
    debug!(path = %path.display(), documents = index.len(), "index loaded");
    Ok(index)
}
