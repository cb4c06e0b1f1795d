use clap::Parser;

use discovery_cli::build::{BuildArgs, BuildOutcome, BuildPlan};

fn main() -> anyhow::Result<()> {
    let args = BuildArgs::parse();
    discovery_cli::init_logging();
    let settings = discovery_cli::load_settings()?;
    let plan = BuildPlan::from_args(&args, &settings)?;

    let progress = discovery_cli::spinner()?;
    let outcome = plan.run(&progress);
    progress.finish_and_clear();

    match outcome? {
        BuildOutcome::UpToDate => {
            println!("Index is up to date: {}", plan.index_path.display());
            println!("Use --rebuild to build it anyway.");
        }
        BuildOutcome::Built { documents, skipped, terms } => {
            println!("Indexed {} documents ({} terms) into {}", documents, terms, plan.index_path.display());
            if skipped > 0 {
                println!("Skipped {} catalog entries, see the warnings above.", skipped);
            }
        }
    }
    Ok(())
}
