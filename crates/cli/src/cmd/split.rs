//! Split a repository

use crate::progress::TerminalListener;
use crate::SplitOptions;
use anyhow::Result;
use git::GitCli;
use owo_colors::OwoColorize;
use split_core::SplitOrchestrator;

pub fn run(options: &SplitOptions, verbose: bool) -> Result<()> {
    // 1. Resolve settings and request
    let settings = options.settings()?;
    let request = options.request();

    // 2. Wire the orchestrator to the git executable
    let backend = GitCli::with_program(settings.git_program.clone());
    let mut orchestrator = SplitOrchestrator::new(backend, settings);
    let mut listener = TerminalListener::new(verbose);

    println!(
        "{} {} into {}",
        "Splitting".bold(),
        request.source.display(),
        request.new_name.cyan()
    );

    // 3. Run the pipeline
    let report = match orchestrator.run(&request, &mut listener) {
        Ok(report) => report,
        Err(failure) => {
            listener.abandon();
            if !failure.error.is_validation() {
                if let Some(destination) = &failure.destination {
                    eprintln!(
                        "{} {} may contain a partially split repository",
                        "Warning:".yellow(),
                        destination.display()
                    );
                }
            }
            return Err(failure.into());
        }
    };

    // 4. Summarize
    println!();
    println!("{}", "Split complete".green().bold());
    println!("{}: {}", "Repository".dimmed(), report.destination.display());

    if report.prune_set.is_empty() {
        println!("{}", "No directories needed removing".dimmed());
    } else {
        println!("Removed from history ({}):", report.prune_set.len().to_string().yellow());
        for path in &report.prune_set {
            println!("  {}", path.to_dir_pattern());
        }
    }

    Ok(())
}
