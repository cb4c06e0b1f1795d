//! Plumbing shared by the `discovery-index` and `discovery-search` binaries.

pub mod build;
pub mod output;
pub mod query;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use discovery_core::config::{resolve_with_base, Config, Settings};

/// Log to stderr so stdout only carries results. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let config = Config::load().context("loading configuration")?;
    Ok(config.settings()?)
}

/// A command-line path wins over the configured one. Both are taken
/// relative to the working directory.
pub fn resolve_path(flag: Option<&Path>, configured: &str) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("reading working directory")?;
    Ok(match flag {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => resolve_with_base(&cwd, configured),
    })
}

pub fn spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_configured_path() {
        let abs = Path::new("/tmp/explicit.json");
        assert_eq!(resolve_path(Some(abs), "ignored.json").unwrap(), abs);

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_path(None, "a/b.json").unwrap(), cwd.join("a/b.json"));
        assert_eq!(resolve_path(Some(Path::new("rel.json")), "x").unwrap(), cwd.join("rel.json"));
    }
}
