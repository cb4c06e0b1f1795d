use clap::Parser;
use std::path::PathBuf;

use discovery_core::config::Settings;
use discovery_core::types::{Kind, ScoredDocument, Suggestion};
use discovery_search::{SearchEngine, SearchOptions};

#[derive(Debug, Parser)]
#[command(name = "discovery-search", version, about = "Search skills and agents in the discovery index")]
pub struct QueryArgs {
    /// Free-text query, or a task description with --suggest
    #[arg(value_name = "QUERY", required_unless_present = "related")]
    pub query: Vec<String>,

    #[arg(short, long, value_parser = parse_limit)]
    pub limit: Option<usize>,

    /// Only return documents of this type (skill, agent)
    #[arg(short = 't', long = "type", value_name = "KIND")]
    pub kind: Option<String>,

    #[arg(long, value_parser = parse_score)]
    pub min_score: Option<f64>,

    /// Find documents similar to this skill or agent instead of searching
    #[arg(short, long, value_name = "NAME", conflicts_with = "suggest")]
    pub related: Option<String>,

    /// Recommend skills and agents for the task described by QUERY
    #[arg(long)]
    pub suggest: bool,

    #[arg(long)]
    pub json: bool,

    #[arg(long, value_name = "PATH")]
    pub index: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Search { query: String, options: SearchOptions },
    Related { reference: String, limit: usize },
    Suggest { task: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Hits(Vec<ScoredDocument>),
    Suggestions(Vec<Suggestion>),
}

impl QueryArgs {
    pub fn request(&self, settings: &Settings) -> Request {
        if let Some(reference) = &self.related {
            return Request::Related {
                reference: reference.clone(),
                limit: self.limit.unwrap_or(settings.search.related_limit),
            };
        }
        let text = self.query.join(" ");
        if self.suggest {
            return Request::Suggest { task: text };
        }
        let mut options = SearchOptions::default()
            .with_limit(self.limit.unwrap_or(settings.search.default_limit))
            .with_min_score(self.min_score.unwrap_or(settings.search.min_score));
        if let Some(kind) = &self.kind {
            options = options.with_kind(Kind::new(kind.to_ascii_lowercase()));
        }
        Request::Search { query: text, options }
    }
}

pub fn execute(engine: &SearchEngine, request: &Request) -> Response {
    match request {
        Request::Search { query, options } => Response::Hits(engine.search(query, options)),
        Request::Related { reference, limit } => Response::Hits(engine.find_related(reference, *limit)),
        Request::Suggest { task } => Response::Suggestions(engine.suggest_for_task(task)),
    }
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_score(raw: &str) -> Result<f64, String> {
    let score: f64 = raw.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(format!("{} is not between 0 and 1", score))
    }
}
