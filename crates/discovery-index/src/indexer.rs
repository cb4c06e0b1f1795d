use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

use discovery_core::tokenize::{term_counts, tokenize};
use discovery_core::traits::CatalogSource;
use discovery_core::types::Document;
use discovery_core::{Error, Result};

use crate::index::{Index, IndexedDocument, SparseVector};

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    /// How many characters of an agent body go into its search text.
    pub agent_excerpt_chars: usize,
    /// Tokenize and weigh documents on the rayon pool.
    pub parallel: bool,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self { agent_excerpt_chars: 500, parallel: true }
    }
}

/// Builds a TF-IDF `Index` from a full catalog.
///
/// Build-time state (token lists, raw counts) lives only inside
/// `build_index`; the returned `Index` holds no reference to it.
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    options: IndexerOptions,
}

impl Indexer {
    pub fn new(options: IndexerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }

    /// Load everything from `source` and build. Skipped entries are already
    /// reported by the source; they do not fail the build.
    pub fn build_from(&self, source: &dyn CatalogSource) -> Result<Index> {
        let catalog = source.load()?;
        if !catalog.skipped.is_empty() {
            warn!(skipped = catalog.skipped.len(), "some catalog entries were skipped");
        }
        self.build_index(&catalog.documents)
    }

    pub fn build_index(&self, documents: &[Document]) -> Result<Index> {
        if documents.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let started = Instant::now();
        let documents = unique_by_id(documents);
        info!(documents = documents.len(), parallel = self.options.parallel, "building index");

        let excerpt = self.options.agent_excerpt_chars;
        let tokens: Vec<Vec<String>> = self.map_documents(&documents, |doc| tokenize(&doc.raw_text(excerpt)));
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "tokenized");

        let idf = self.inverse_document_frequencies(&tokens);
        debug!(terms = idf.len(), "computed idf");

        let weighted: Vec<SparseVector> = if self.options.parallel {
            tokens.par_iter().map(|t| tfidf_vector(t, &idf)).collect()
        } else {
            tokens.iter().map(|t| tfidf_vector(t, &idf)).collect()
        };

        let mut index = Index::empty();
        for (doc, vector) in documents.iter().zip(weighted) {
            if vector.is_empty() {
                debug!(id = %doc.id, "document produced no terms");
            }
            index.documents.insert(doc.id.clone(), IndexedDocument::from(*doc));
            index.vectors.insert(doc.id.clone(), vector);
        }
        index.idf = idf;

        info!(
            documents = index.len(),
            terms = index.idf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index built"
        );
        Ok(index)
    }

    fn map_documents<T, F>(&self, documents: &[&Document], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Document) -> T + Send + Sync,
    {
        if self.options.parallel {
            documents.par_iter().map(|doc| f(*doc)).collect()
        } else {
            documents.iter().map(|doc| f(*doc)).collect()
        }
    }

    /// `idf[t] = ln(N / (df(t) + 1)) + 1`
    fn inverse_document_frequencies(&self, tokens: &[Vec<String>]) -> BTreeMap<String, f64> {
        let df = if self.options.parallel {
            tokens
                .par_iter()
                .fold(HashMap::new, count_distinct)
                .reduce(HashMap::new, merge_counts)
        } else {
            tokens.iter().fold(HashMap::new(), count_distinct)
        };

        let n = tokens.len() as f64;
        df.into_iter()
            .map(|(term, count)| (term.to_string(), (n / (count as f64 + 1.0)).ln() + 1.0))
            .collect()
    }
}

/// Normalized term frequency times IDF, for one token sequence.
///
/// `tf = count / max_count`. Terms with IDF zero (unknown to the table) are
/// dropped, so the result only holds positive weights. No tokens gives an
/// empty vector.
pub fn tfidf_vector(tokens: &[String], idf: &BTreeMap<String, f64>) -> SparseVector {
    let counts = term_counts(tokens);
    let Some(max) = counts.values().copied().max() else {
        return SparseVector::new();
    };
    counts
        .into_iter()
        .filter_map(|(term, count)| {
            let weight = idf.get(term).copied().unwrap_or(0.0);
            (weight > 0.0).then(|| (term.to_string(), count as f64 / max as f64 * weight))
        })
        .collect()
}

/// Each document adds at most one to a term's count.
fn count_distinct<'a>(mut acc: HashMap<&'a str, usize>, tokens: &'a Vec<String>) -> HashMap<&'a str, usize> {
    let distinct: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    for term in distinct {
        *acc.entry(term).or_insert(0) += 1;
    }
    acc
}

fn merge_counts<'a>(mut a: HashMap<&'a str, usize>, b: HashMap<&'a str, usize>) -> HashMap<&'a str, usize> {
    for (term, count) in b {
        *a.entry(term).or_insert(0) += count;
    }
    a
}

/// Ordered by id; a later duplicate replaces an earlier one.
fn unique_by_id(documents: &[Document]) -> Vec<&Document> {
    let mut by_id: BTreeMap<&str, &Document> = BTreeMap::new();
    for doc in documents {
        if by_id.insert(doc.id.as_str(), doc).is_some() {
            warn!(id = %doc.id, "duplicate document id, keeping the last one");
        }
    }
    by_id.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use discovery_core::types::Kind;

    fn skill(name: &str, description: &str) -> Document {
        Document::new(Kind::skill(), name).with_description(description)
    }

    fn sequential() -> Indexer {
        Indexer::new(IndexerOptions { parallel: false, ..IndexerOptions::default() })
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(Indexer::default().build_index(&[]), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn idf_follows_smoothed_formula() {
        let docs = vec![
            skill("x", "shared alpha"),
            skill("y", "shared beta"),
            skill("z", "shared alpha"),
        ];
        let index = sequential().build_index(&docs).unwrap();
        let n = 3.0_f64;
        // "shared" is in all three, "alpha" in two, "beta" in one
        assert!((index.idf("shared") - ((n / 4.0).ln() + 1.0)).abs() < 1e-12);
        assert!((index.idf("alpha") - ((n / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((index.idf("beta") - ((n / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!(index.idf("beta") > index.idf("alpha"));
        assert!(index.idf("shared") > 0.0);
    }

    #[test]
    fn vector_weights_use_max_normalized_tf() {
        let docs = vec![skill("x", "cache cache miss"), skill("y", "other words")];
        let index = sequential().build_index(&docs).unwrap();
        let v = index.vector("skill:x").unwrap();
        assert!((v["cache"] - index.idf("cache")).abs() < 1e-12);
        assert!((v["miss"] - 0.5 * index.idf("miss")).abs() < 1e-12);
        assert!(!v.contains_key("words"));
    }

    #[test]
    fn stopword_only_document_keeps_metadata_with_empty_vector() {
        // name "aa" is too short to form a term
        let docs = vec![skill("aa", "the and of"), skill("real", "database tuning")];
        let index = sequential().build_index(&docs).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.document("skill:aa").is_some());
        assert!(index.vector("skill:aa").unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_keep_the_last_document() {
        let docs = vec![skill("x", "first version"), skill("x", "second version")];
        let index = sequential().build_index(&docs).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.document("skill:x").unwrap().description, "second version");
    }

    #[test]
    fn agent_excerpt_is_bounded() {
        let body = format!("{} tailterm", "filler ".repeat(20));
        let docs = vec![Document::new(Kind::agent(), "bot").with_body(body)];
        let short = Indexer::new(IndexerOptions { agent_excerpt_chars: 30, parallel: false });
        let index = short.build_index(&docs).unwrap();
        assert!(!index.idf.contains_key("tailterm"));

        let long = Indexer::new(IndexerOptions { agent_excerpt_chars: 500, parallel: false });
        let index = long.build_index(&docs).unwrap();
        assert!(index.idf.contains_key("tailterm"));
    }

    #[test]
    fn tfidf_vector_drops_unknown_terms() {
        let mut idf = BTreeMap::new();
        idf.insert("known".to_string(), 2.0);
        let tokens = tokenize("known unknown known");
        let v = tfidf_vector(&tokens, &idf);
        assert_eq!(v.len(), 1);
        assert!((v["known"] - 2.0).abs() < 1e-12);
        assert!(tfidf_vector(&[], &idf).is_empty());
    }
}
