//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys come from double underscores, e.g. `APP_INDEX__PATH`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let settings = self.settings()?;
        if !(0.0..=1.0).contains(&settings.search.min_score) {
            return Err(Error::InvalidConfig(format!(
                "search.min_score must lie in [0, 1], got {}",
                settings.search.min_score
            )));
        }
        if settings.search.default_limit == 0 {
            return Err(Error::InvalidConfig("search.default_limit must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub index: IndexSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub manifest_path: String,
    pub agents_dir: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            manifest_path: ".claude/skills/MANIFEST.json".to_string(),
            agents_dir: ".claude/agents".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub path: String,
    /// Upper bound, in characters, on how much of an agent body is indexed.
    pub agent_excerpt_chars: usize,
    pub parallel: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: ".claude/skills/_discovery/index.json".to_string(),
            agent_excerpt_chars: 500,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_limit: usize,
    pub min_score: f64,
    pub related_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 10, min_score: 0.1, related_limit: 5 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_files() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
            let settings = config.settings().map_err(|e| e.to_string())?;
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.index.agent_excerpt_chars, 500);
            Ok(())
        });
    }

    #[test]
    fn env_file_and_vars_layer_over_base() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [search]
                default_limit = 20
                min_score = 0.2
                "#,
            )?;
            jail.create_file(
                "config.test.toml",
                r#"
                [index]
                path = "tmp/index.json"
                "#,
            )?;
            jail.set_env("APP_SEARCH__MIN_SCORE", "0.3");

            let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
            let settings = config.settings().map_err(|e| e.to_string())?;
            assert_eq!(settings.search.default_limit, 20);
            assert!((settings.search.min_score - 0.3).abs() < 1e-9);
            assert_eq!(settings.index.path, "tmp/index.json");
            let limit: usize = config.get("search.related_limit").map_err(|e| e.to_string())?;
            assert_eq!(limit, 5);
            Ok(())
        });
    }

    #[test]
    fn out_of_range_min_score_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[search]\nmin_score = 1.5\n")?;
            assert!(matches!(Config::load_for_env("test"), Err(Error::InvalidConfig(_))));
            Ok(())
        });
    }

    #[test]
    fn resolve_keeps_absolute_and_joins_relative() {
        let base = Path::new("/srv/app");
        assert_eq!(resolve_with_base(base, "/etc/x.json"), PathBuf::from("/etc/x.json"));
        assert_eq!(resolve_with_base(base, "data/x.json"), PathBuf::from("/srv/app/data/x.json"));
    }
}
