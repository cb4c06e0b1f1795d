use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use discovery_core::types::{DocId, Document, Kind};
use discovery_core::{Error, Result};

/// Format tag written into every index file. Readers accept any `1.x`.
pub const INDEX_FORMAT_VERSION: &str = "1.0.0";

/// Term -> weight. Terms absent from the map have weight zero.
pub type SparseVector = BTreeMap<String, f64>;

/// Document metadata kept in the index. Tokens and raw text are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    #[serde(rename = "type")]
    pub kind: Kind,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Accepts `null` wherever the field's default would do.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&Document> for IndexedDocument {
    fn from(doc: &Document) -> Self {
        Self {
            kind: doc.kind.clone(),
            name: doc.name.clone(),
            description: doc.description.clone(),
            category: doc.category.clone().unwrap_or_default(),
            tags: doc.tags.clone(),
        }
    }
}

/// The serialized bundle shared between build and search.
///
/// All maps are ordered so that two builds from the same catalog serialize
/// byte-for-byte identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub version: String,
    pub documents: BTreeMap<DocId, IndexedDocument>,
    pub idf: BTreeMap<String, f64>,
    pub vectors: BTreeMap<DocId, SparseVector>,
}

impl Default for Index {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index {
    /// An index over zero documents. Every search against it is empty.
    pub fn empty() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION.to_string(),
            documents: BTreeMap::new(),
            idf: BTreeMap::new(),
            vectors: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, id: &str) -> Option<&IndexedDocument> {
        self.documents.get(id)
    }

    /// Stored vector, if the document has one.
    pub fn vector(&self, id: &str) -> Option<&SparseVector> {
        self.vectors.get(id)
    }

    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    pub(crate) fn check_version(&self) -> Result<()> {
        let major = self.version.split('.').next().unwrap_or_default();
        let expected = INDEX_FORMAT_VERSION.split('.').next().unwrap_or_default();
        if major == expected {
            Ok(())
        } else {
            Err(Error::IndexCorrupt(format!(
                "unsupported index format version {:?}, expected {}.x",
                self.version, expected
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_has_current_version() {
        let index = Index::empty();
        assert!(index.is_empty());
        assert_eq!(index.version, INDEX_FORMAT_VERSION);
        assert!(index.check_version().is_ok());
    }

    #[test]
    fn minor_versions_are_compatible() {
        let mut index = Index::empty();
        index.version = "1.4.2".into();
        assert!(index.check_version().is_ok());
        index.version = "2.0.0".into();
        assert!(matches!(index.check_version(), Err(Error::IndexCorrupt(_))));
    }

    #[test]
    fn metadata_uses_type_key_and_empty_category() {
        let doc = Document::new(Kind::agent(), "reviewer").with_description("Reviews code");
        let meta = IndexedDocument::from(&doc);
        let json = serde_json::to_value(&meta).expect("serialize");
        assert_eq!(json["type"], "agent");
        assert_eq!(json["category"], "");
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn null_metadata_fields_read_as_empty() {
        let meta: IndexedDocument = serde_json::from_str(
            r#"{"type": "skill", "name": "sql-tuning", "description": null, "category": null, "tags": null}"#,
        )
        .expect("null fields accepted");
        assert_eq!(meta.category, "");
        assert_eq!(meta.description, "");
        assert!(meta.tags.is_empty());

        let bare: IndexedDocument =
            serde_json::from_str(r#"{"type": "agent", "name": "reviewer"}"#).expect("missing fields accepted");
        assert_eq!(bare.category, "");
    }

    #[test]
    fn unknown_terms_have_zero_idf() {
        let mut index = Index::empty();
        index.idf.insert("cache".into(), 1.5);
        assert!((index.idf("cache") - 1.5).abs() < f64::EPSILON);
        assert_eq!(index.idf("missing"), 0.0);
    }
}
