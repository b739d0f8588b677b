//! Terminal progress for the split pipeline

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use split_core::{GitCommand, ProgressListener, SplitStage};
use std::time::Duration;

/// Longest output line shown next to the spinner
const MAX_STATUS_WIDTH: usize = 72;

/// Shows a spinner per stage and the latest line of git output
///
/// In verbose mode every command and output line is printed above the
/// spinner instead of replacing its message.
pub struct TerminalListener {
    verbose: bool,
    bar: Option<ProgressBar>,
    stage: Option<SplitStage>,
}

impl TerminalListener {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            bar: None,
            stage: None,
        }
    }

    /// Clear the spinner of a stage that never finished
    pub fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        if let Some(stage) = self.stage.take() {
            eprintln!("{} {}", "✗".red(), stage.label().red());
        }
    }

    fn spinner(&self, stage: SplitStage) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg:.dimmed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_prefix(stage.label());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    fn print(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }
}

impl ProgressListener for TerminalListener {
    fn stage_started(&mut self, stage: SplitStage) {
        self.bar = Some(self.spinner(stage));
        self.stage = Some(stage);
    }

    fn stage_finished(&mut self, stage: SplitStage) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.stage = None;
        eprintln!("{} {}", "✓".green(), stage.label());
    }

    fn stage_skipped(&mut self, stage: SplitStage, reason: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.stage = None;
        eprintln!(
            "{} {} {}",
            "-".dimmed(),
            stage.label().dimmed(),
            format!("({})", reason).dimmed()
        );
    }

    fn command(&mut self, _stage: SplitStage, command: &GitCommand) {
        if self.verbose {
            self.print(&format!("  $ {}", command).dimmed().to_string());
        }
    }

    fn output_line(&mut self, _stage: SplitStage, line: &str) {
        if self.verbose {
            self.print(&format!("    {}", line));
        } else if let Some(bar) = &self.bar {
            bar.set_message(truncate(line.trim(), MAX_STATUS_WIDTH));
        }
    }
}

fn truncate(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let mut out: String = line.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
