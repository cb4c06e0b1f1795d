//! Catalog loading.
//!
//! The on-disk catalog is a JSON manifest of skills plus a directory of agent
//! Markdown files with YAML front matter. Individual entries that cannot be
//! read are skipped and reported; only a catalog that is unreadable as a whole
//! is an error.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::CatalogSource;
use crate::types::{Document, Kind};

/// Agent files that document the directory rather than describe an agent.
const IGNORED_AGENT_FILES: &[&str] = &["README.md", "INVOCATION_MANIFEST.md"];

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedEntry>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// An entry left out of the build, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub source: String,
    pub reason: String,
}

impl SkippedEntry {
    fn new(source: impl Into<String>, reason: impl Into<String>) -> Self {
        let entry = Self { source: source.into(), reason: reason.into() };
        warn!(source = %entry.source, reason = %entry.reason, "skipping catalog entry");
        entry
    }
}

/// A fixed set of documents, already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog(pub Vec<Document>);

impl CatalogSource for InMemoryCatalog {
    fn load(&self) -> Result<Catalog> {
        Ok(Catalog { documents: self.0.clone(), skipped: Vec::new() })
    }
}

#[derive(Debug, Deserialize)]
struct SkillEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    related_skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    description: Option<String>,
}

/// Skills from `MANIFEST.json`, agents from `<agents_dir>/*.md`.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    pub manifest_path: PathBuf,
    pub agents_dir: PathBuf,
}

impl ManifestCatalog {
    pub fn new(manifest_path: impl Into<PathBuf>, agents_dir: impl Into<PathBuf>) -> Self {
        Self { manifest_path: manifest_path.into(), agents_dir: agents_dir.into() }
    }

    /// Most recent modification time across the manifest, the agents
    /// directory and the agent files.
    ///
    /// Used to decide whether an existing index is stale. The directory's own
    /// mtime moves when an agent file is added or deleted.
    pub fn last_modified(&self) -> Option<SystemTime> {
        [self.manifest_path.clone(), self.agents_dir.clone()]
            .into_iter()
            .chain(self.agent_files())
            .filter_map(|p| fs::metadata(&p).and_then(|m| m.modified()).ok())
            .max()
    }

    fn agent_files(&self) -> Vec<PathBuf> {
        if !self.agents_dir.is_dir() {
            return Vec::new();
        }
        walkdir::WalkDir::new(&self.agents_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("md"))
            .filter(|p| {
                let name = p.file_name().and_then(|s| s.to_str()).unwrap_or_default();
                !IGNORED_AGENT_FILES.contains(&name)
            })
            .collect()
    }

    fn load_skills(&self, catalog: &mut Catalog) -> Result<()> {
        let raw = fs::read_to_string(&self.manifest_path).map_err(|e| {
            Error::Catalog(format!("cannot read {}: {}", self.manifest_path.display(), e))
        })?;
        let manifest: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            Error::Catalog(format!("cannot parse {}: {}", self.manifest_path.display(), e))
        })?;
        let skills = match manifest.get("skills") {
            None => {
                warn!(path = %self.manifest_path.display(), "manifest has no `skills` section");
                return Ok(());
            }
            Some(serde_json::Value::Object(skills)) => skills,
            Some(_) => {
                return Err(Error::Catalog(format!(
                    "`skills` in {} is not an object",
                    self.manifest_path.display()
                )))
            }
        };

        for (name, value) in skills {
            match SkillEntry::deserialize(value) {
                Ok(entry) => catalog.documents.push(skill_document(name, entry)),
                Err(e) => catalog
                    .skipped
                    .push(SkippedEntry::new(format!("skill:{}", name), e.to_string())),
            }
        }
        Ok(())
    }

    fn load_agents(&self, catalog: &mut Catalog) {
        for path in self.agent_files() {
            let source = path.display().to_string();
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    catalog.skipped.push(SkippedEntry::new(source, e.to_string()));
                    continue;
                }
            };
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    catalog.skipped.push(SkippedEntry::new(source, "not valid UTF-8"));
                    continue;
                }
            };
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                catalog.skipped.push(SkippedEntry::new(source, "file name is not valid UTF-8"));
                continue;
            };
            let description = front_matter_description(&content, &path);
            catalog.documents.push(
                Document::new(Kind::agent(), name)
                    .with_description(description)
                    .with_body(content),
            );
        }
    }
}

impl CatalogSource for ManifestCatalog {
    fn load(&self) -> Result<Catalog> {
        let has_manifest = self.manifest_path.is_file();
        let has_agents = self.agents_dir.is_dir();
        if !has_manifest && !has_agents {
            return Err(Error::Catalog(format!(
                "neither {} nor {} exists",
                self.manifest_path.display(),
                self.agents_dir.display()
            )));
        }

        let mut catalog = Catalog::default();
        if has_manifest {
            self.load_skills(&mut catalog)?;
        } else {
            warn!(path = %self.manifest_path.display(), "manifest not found, indexing agents only");
        }
        if has_agents {
            self.load_agents(&mut catalog);
        } else {
            warn!(path = %self.agents_dir.display(), "agents directory not found, indexing skills only");
        }
        debug!(documents = catalog.len(), skipped = catalog.skipped.len(), "catalog loaded");
        Ok(catalog)
    }
}

fn skill_document(name: &str, entry: SkillEntry) -> Document {
    let mut doc = Document::new(Kind::skill(), name)
        .with_description(entry.description)
        .with_tags(entry.tags)
        .with_related(entry.related_skills);
    if let Some(category) = entry.category.filter(|c| !c.is_empty()) {
        doc = doc.with_category(category);
    }
    doc
}

/// `description` from a leading `---` YAML block, or empty.
///
/// Front matter that is not valid YAML (an unquoted colon in the value is
/// common) falls back to the first `description:` line.
fn front_matter_description(content: &str, path: &Path) -> String {
    if !content.starts_with("---") {
        return String::new();
    }
    let mut parts = content.splitn(3, "---");
    let (Some(_), Some(yaml), Some(_)) = (parts.next(), parts.next(), parts.next()) else {
        return String::new();
    };
    if yaml.trim().is_empty() {
        return String::new();
    }
    match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(front) => front.description.unwrap_or_default().trim().to_string(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unparsable front matter, scanning for description line");
            description_line(yaml).unwrap_or_default()
        }
    }
}

fn description_line(front: &str) -> Option<String> {
    front.lines().find_map(|line| {
        let value = line.strip_prefix("description:")?.trim();
        Some(value.trim_matches(|c: char| c == '"' || c == '\'').to_string())
    })
}
