//! discovery-index
//!
//! TF-IDF index build and persistence. `Indexer` turns a catalog into an
//! `Index`; `store` writes it to disk and reads it back.

pub mod index;
pub mod indexer;
pub mod store;

pub use index::{Index, IndexedDocument, SparseVector, INDEX_FORMAT_VERSION};
pub use indexer::{tfidf_vector, Indexer, IndexerOptions};
