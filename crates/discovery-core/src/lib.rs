#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! discovery-core
//!
//! Shared pieces of the skill discovery engine: domain types, the error
//! taxonomy, configuration, the tokenizer and catalog loading.

pub mod catalog;
pub mod config;
pub mod error;
pub mod tokenize;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use tokenize::tokenize;
pub use types::{Document, Kind, ScoredDocument};
