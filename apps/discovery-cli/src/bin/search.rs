use clap::Parser;

use discovery_cli::output;
use discovery_cli::query::{execute, QueryArgs, Request};
use discovery_search::SearchEngine;

fn main() -> anyhow::Result<()> {
    let args = QueryArgs::parse();
    discovery_cli::init_logging();
    let settings = discovery_cli::load_settings()?;
    let index_path = discovery_cli::resolve_path(args.index.as_deref(), &settings.index.path)?;

    let engine = SearchEngine::open(&index_path);
    let request = args.request(&settings);
    let response = execute(&engine, &request);

    if args.json {
        println!("{}", output::render_json(&response)?);
        return Ok(());
    }
    let title = match &request {
        Request::Search { query, .. } => format!("\"{}\"", query),
        Request::Related { reference, .. } => format!("documents related to {}", reference),
        Request::Suggest { task } => format!("\"{}\"", task),
    };
    print!("{}", output::render(&title, &response));
    Ok(())
}
