//! Human and JSON renderings of query results.

use discovery_core::types::{ScoredDocument, Suggestion};
use discovery_search::search::truncate_chars;

use crate::query::Response;

const BAR_WIDTH: f64 = 20.0;
const DESCRIPTION_CHARS: usize = 80;
const SHOWN_TAGS: usize = 5;

pub fn render(title: &str, response: &Response) -> String {
    match response {
        Response::Hits(hits) => render_hits(title, hits),
        Response::Suggestions(suggestions) => render_suggestions(title, suggestions),
    }
}

pub fn render_json(response: &Response) -> serde_json::Result<String> {
    match response {
        Response::Hits(hits) => serde_json::to_string_pretty(hits),
        Response::Suggestions(suggestions) => serde_json::to_string_pretty(suggestions),
    }
}

pub fn render_hits(title: &str, hits: &[ScoredDocument]) -> String {
    if hits.is_empty() {
        return format!("No results for {}\n", title);
    }
    let mut out = format!("{} result(s) for {}\n\n", hits.len(), title);
    for (rank, hit) in hits.iter().enumerate() {
        out.push_str(&format!("{:>2}. [{}] {}\n", rank + 1, hit.kind, hit.name));
        out.push_str(&format!("    score {:.3} {}\n", hit.score, score_bar(hit.score)));
        if !hit.description.is_empty() {
            out.push_str(&format!("    {}\n", truncate_chars(&hit.description, DESCRIPTION_CHARS)));
        }
        if !hit.tags.is_empty() {
            let tags: Vec<&str> = hit.tags.iter().take(SHOWN_TAGS).map(String::as_str).collect();
            out.push_str(&format!("    tags: {}\n", tags.join(", ")));
        }
        out.push('\n');
    }
    out
}

pub fn render_suggestions(title: &str, suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return format!("No suggestions for {}\n", title);
    }
    let mut out = format!("Suggestions for {}\n\n", title);
    for (rank, s) in suggestions.iter().enumerate() {
        out.push_str(&format!("{:>2}. {} ({}, {})\n", rank + 1, s.recommendation, s.kind, s.relevance));
        if !s.reason.is_empty() {
            out.push_str(&format!("    {}\n", s.reason));
        }
    }
    out
}

/// One block per 5% of score.
pub fn score_bar(score: f64) -> String {
    let blocks = (score.clamp(0.0, 1.0) * BAR_WIDTH) as usize;
    "█".repeat(blocks)
}
