use parking_lot::RwLock;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use discovery_core::tokenize::tokenize;
use discovery_core::types::{Kind, ScoredDocument, Suggestion};
use discovery_core::{Error, Result};
use discovery_index::{store, tfidf_vector, Index, IndexedDocument, SparseVector};

use crate::similarity::cosine;

/// How many hits `suggest_for_task` turns into suggestions.
const SUGGESTION_LIMIT: usize = 5;
/// Suggestion reasons are cut to this many characters.
const REASON_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    pub kind: Option<Kind>,
    pub min_score: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: 10, kind: None, min_score: 0.1 }
    }
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }
}

/// Ranks documents of a loaded index.
///
/// The index is held as an immutable snapshot. `reload`/`swap` replace the
/// snapshot atomically; a search already running keeps the one it started
/// with. All query methods are total: a missing index, an unknown document
/// or a query without usable terms yields an empty result.
pub struct SearchEngine {
    index: RwLock<Arc<Index>>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::empty()
    }
}

impl SearchEngine {
    pub fn new(index: Index) -> Self {
        Self { index: RwLock::new(Arc::new(index)) }
    }

    pub fn empty() -> Self {
        Self::new(Index::empty())
    }

    /// Load from disk, falling back to an empty index if the file is
    /// missing or unreadable.
    pub fn open(path: &Path) -> Self {
        match Self::try_open(path) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "search index unavailable, using an empty index");
                Self::empty()
            }
        }
    }

    pub fn try_open(path: &Path) -> Result<Self> {
        let index = store::load(path)?;
        info!(path = %path.display(), documents = index.len(), "search index loaded");
        Ok(Self::new(index))
    }

    /// Pick up a rebuilt index. On failure the current snapshot stays in
    /// place and `false` is returned.
    pub fn reload(&self, path: &Path) -> bool {
        match store::load(path) {
            Ok(index) => {
                self.swap(index);
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reload failed, keeping current index");
                false
            }
        }
    }

    pub fn swap(&self, index: Index) -> Arc<Index> {
        let next = Arc::new(index);
        let previous = std::mem::replace(&mut *self.index.write(), next);
        debug!(previous = previous.len(), "search index swapped");
        previous
    }

    pub fn snapshot(&self) -> Arc<Index> {
        Arc::clone(&self.index.read())
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Rank documents against free text.
    ///
    /// Hits scoring below `min_score` (clamped into `[0, 1]`) are dropped.
    /// Ordering is by score descending, then id ascending.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<ScoredDocument> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        let index = self.snapshot();
        let query_vector = tfidf_vector(&tokens, &index.idf);
        if query_vector.is_empty() {
            debug!(query, "no query term is known to the index");
            return Vec::new();
        }

        let min_score = options.min_score.clamp(0.0, 1.0);
        let empty = SparseVector::new();
        let hits = index
            .documents
            .iter()
            .filter(|(_, doc)| options.kind.as_ref().map_or(true, |k| &doc.kind == k))
            .map(|(id, doc)| {
                let vector = index.vector(id).unwrap_or(&empty);
                (id, doc, cosine(&query_vector, vector))
            })
            .filter(|(_, _, score)| *score >= min_score)
            .map(|(id, doc, score)| scored(id, doc, score))
            .collect();
        rank(hits, options.limit)
    }

    /// Documents most similar to `reference`, which is either a full id
    /// (`skill:sql-tuning`) or a bare name (`sql-tuning`).
    ///
    /// The reference itself is never part of the result and only hits with
    /// a positive score are kept.
    pub fn find_related(&self, reference: &str, limit: usize) -> Vec<ScoredDocument> {
        match self.try_find_related(reference, limit) {
            Ok(hits) => hits,
            Err(e) => {
                debug!(reference, error = %e, "no related documents");
                Vec::new()
            }
        }
    }

    pub fn try_find_related(&self, reference: &str, limit: usize) -> Result<Vec<ScoredDocument>> {
        let index = self.snapshot();
        let id = resolve_reference(&index, reference)
            .ok_or_else(|| Error::DocumentNotFound(reference.to_string()))?;
        let target = index
            .vector(id)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::DocumentNotFound(format!("{} has no indexed terms", id)))?;

        let hits = index
            .documents
            .iter()
            .filter(|(other, _)| other.as_str() != id)
            .filter_map(|(other, doc)| {
                let score = index.vector(other).map_or(0.0, |v| cosine(target, v));
                (score > 0.0).then(|| scored(other, doc, score))
            })
            .collect();
        Ok(rank(hits, limit))
    }

    /// Top hits for a task description, shaped as recommendations.
    pub fn suggest_for_task(&self, task: &str) -> Vec<Suggestion> {
        self.search(task, &SearchOptions::default().with_limit(SUGGESTION_LIMIT))
            .into_iter()
            .map(|hit| Suggestion {
                recommendation: hit.name,
                kind: hit.kind,
                relevance: format!("{:.0}%", hit.score * 100.0),
                reason: truncate_chars(&hit.description, REASON_CHARS),
            })
            .collect()
    }
}

fn resolve_reference<'a>(index: &'a Index, reference: &str) -> Option<&'a str> {
    if let Some((id, _)) = index.documents.get_key_value(reference) {
        return Some(id.as_str());
    }
    let suffix = format!(":{}", reference);
    index
        .documents
        .keys()
        .find(|id| id.ends_with(&suffix))
        .map(String::as_str)
}

fn scored(id: &str, doc: &IndexedDocument, score: f64) -> ScoredDocument {
    ScoredDocument {
        id: id.to_string(),
        kind: doc.kind.clone(),
        name: doc.name.clone(),
        description: doc.description.clone(),
        category: doc.category.clone(),
        tags: doc.tags.clone(),
        score,
    }
}

fn rank(mut hits: Vec<ScoredDocument>, limit: usize) -> Vec<ScoredDocument> {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    hits.truncate(limit);
    hits
}

/// First `max` characters, with `...` appended when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}
