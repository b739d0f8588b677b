//! Dry run: show what a split would remove

use crate::SplitOptions;
use anyhow::Result;
use git::GitCli;
use owo_colors::OwoColorize;
use split_core::SplitOrchestrator;

pub fn run(options: &SplitOptions) -> Result<()> {
    let settings = options.settings()?;
    let request = options.request();

    // Nothing is executed; the backend is only needed to build the orchestrator
    let backend = GitCli::with_program(settings.git_program.clone());
    let mut orchestrator = SplitOrchestrator::new(backend, settings);
    let plan = orchestrator.plan(&request)?;

    println!("{}", "Dry run - nothing will be changed".bold());
    println!("{}: {}", "New repository".dimmed(), plan.destination.display());
    println!();

    if plan.prune_set.is_empty() {
        println!("{}", "No directories would be removed".dimmed());
        return Ok(());
    }

    println!("Would remove from history ({}):", plan.prune_set.len().to_string().yellow());
    for path in &plan.prune_set {
        println!("  {}", path.to_dir_pattern());
    }

    if let Some(rewrite) = &plan.rewrite {
        println!();
        println!("{}", "History rewrite:".dimmed());
        println!("  {}", rewrite);
    }

    Ok(())
}
