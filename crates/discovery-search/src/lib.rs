//! discovery-search
//!
//! Query-time side of the discovery engine: loads a built index and ranks
//! its documents by cosine similarity against a query or another document.

pub mod search;
pub mod similarity;

pub use search::{SearchEngine, SearchOptions};
pub use similarity::cosine;
