use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog is empty: nothing to index")]
    EmptyCatalog,

    #[error("Catalog unreadable: {0}")]
    Catalog(String),

    #[error("Index not found at {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Index corrupt: {0}")]
    IndexCorrupt(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors the search path absorbs into "no results" rather than surfacing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::IndexNotFound(_) | Error::IndexCorrupt(_) | Error::DocumentNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
