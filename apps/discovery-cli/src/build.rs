use anyhow::Context;
use clap::Parser;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::info;

use discovery_core::catalog::ManifestCatalog;
use discovery_core::config::Settings;
use discovery_core::traits::CatalogSource;
use discovery_index::{store, Indexer, IndexerOptions};

use crate::resolve_path;

#[derive(Debug, Parser)]
#[command(name = "discovery-index", version, about = "Build the skill and agent discovery index")]
pub struct BuildArgs {
    /// Rebuild even when the index is newer than every catalog file
    #[arg(long)]
    pub rebuild: bool,

    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub agents_dir: Option<PathBuf>,

    /// Where the index file is written
    #[arg(long, value_name = "PATH")]
    pub index: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    UpToDate,
    Built { documents: usize, skipped: usize, terms: usize },
}

#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub catalog: ManifestCatalog,
    pub index_path: PathBuf,
    pub options: IndexerOptions,
    pub rebuild: bool,
}

impl BuildPlan {
    pub fn from_args(args: &BuildArgs, settings: &Settings) -> anyhow::Result<Self> {
        let manifest = resolve_path(args.manifest.as_deref(), &settings.catalog.manifest_path)?;
        let agents_dir = resolve_path(args.agents_dir.as_deref(), &settings.catalog.agents_dir)?;
        let index_path = resolve_path(args.index.as_deref(), &settings.index.path)?;
        Ok(Self {
            catalog: ManifestCatalog::new(manifest, agents_dir),
            index_path,
            options: IndexerOptions {
                agent_excerpt_chars: settings.index.agent_excerpt_chars,
                parallel: settings.index.parallel,
            },
            rebuild: args.rebuild,
        })
    }

    pub fn run(&self, progress: &ProgressBar) -> anyhow::Result<BuildOutcome> {
        if !self.rebuild && is_fresh(&self.index_path, self.catalog.last_modified()) {
            info!(path = %self.index_path.display(), "index is newer than the catalog, skipping build");
            return Ok(BuildOutcome::UpToDate);
        }

        progress.set_message("loading catalog");
        let catalog = self.catalog.load().with_context(|| {
            format!("loading catalog from {}", self.catalog.manifest_path.display())
        })?;

        progress.set_message(format!("indexing {} documents", catalog.len()));
        let index = Indexer::new(self.options.clone()).build_index(&catalog.documents)?;

        progress.set_message("writing index");
        store::save(&index, &self.index_path)
            .with_context(|| format!("writing index to {}", self.index_path.display()))?;

        Ok(BuildOutcome::Built {
            documents: index.len(),
            skipped: catalog.skipped.len(),
            terms: index.idf.len(),
        })
    }
}

/// True when the index exists and was modified after the newest catalog file.
pub fn is_fresh(index_path: &Path, catalog_modified: Option<SystemTime>) -> bool {
    let Ok(index_modified) = fs::metadata(index_path).and_then(|m| m.modified()) else {
        return false;
    };
    catalog_modified.map_or(false, |catalog| index_modified > catalog)
}
