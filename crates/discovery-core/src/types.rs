//! Domain types shared by the indexer and the search engine.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type DocId = String;

/// Category tag of a catalog entry.
///
/// Kinds form an open set: the catalog may introduce new ones without the
/// engine knowing about them, so this is a string tag rather than an enum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(String);

impl Kind {
    pub const SKILL: &'static str = "skill";
    pub const AGENT: &'static str = "agent";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn skill() -> Self {
        Self::new(Self::SKILL)
    }

    pub fn agent() -> Self {
        Self::new(Self::AGENT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_agent(&self) -> bool {
        self.0 == Self::AGENT
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Kind {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// A catalog entry as handed to the indexer.
///
/// - `id`: `<kind>:<name>`, stable across rebuilds
/// - `related`: names of related entries, folded into the search text
/// - `body`: long-form text; only an `agent` body contributes, and only a
///   bounded prefix of it
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub kind: Kind,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub related: Vec<String>,
    pub body: Option<String>,
}

impl Document {
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("{}:{}", kind, name),
            kind,
            name,
            description: String::new(),
            category: None,
            tags: Vec::new(),
            related: Vec::new(),
            body: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = related.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Text the indexer tokenizes. Never persisted.
    ///
    /// `excerpt_chars` bounds how much of an agent body is included; it is
    /// counted in characters so a multi-byte code point is never split.
    pub fn raw_text(&self, excerpt_chars: usize) -> String {
        let mut parts: Vec<String> = vec![
            self.name.replace('-', " "),
            self.description.clone(),
            self.tags.join(" "),
            self.category.clone().unwrap_or_default(),
        ];
        parts.extend(self.related.iter().map(|r| r.replace('-', " ")));
        if self.kind.is_agent() {
            if let Some(body) = &self.body {
                parts.push(body.chars().take(excerpt_chars).collect());
            }
        }
        parts.join(" ")
    }
}

/// A ranked search hit. `score` is a cosine similarity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: DocId,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub score: f64,
}

/// A search hit reshaped for task recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub recommendation: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub relevance: String,
    pub reason: String,
}
