//! Reposplit CLI - reposplit command

use clap::{ArgAction, Parser};
use cli_lib::{cmd, SplitOptions};
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing::Level;

/// Reposplit - Extract directories of a git repository into a new repository with their history
#[derive(Parser)]
#[command(name = "reposplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    split: SplitOptions,

    /// Show what would be removed without cloning or rewriting anything
    ///
    /// Reads the source working copy. Ignored directories are skipped, but
    /// untracked directories that are not ignored may be listed even though
    /// a clone would not contain them.
    #[arg(long)]
    dry_run: bool,

    /// Print git commands and their output (-vv for debug logging)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = if cli.dry_run {
        cmd::plan::run(&cli.split)
    } else {
        cmd::split::run(&cli.split, cli.verbose > 0)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
