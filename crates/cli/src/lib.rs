//! Command-line front end for reposplit

pub mod cmd;
pub mod config;
pub mod progress;

use anyhow::Result;
use clap::Args;
use split_core::{RetentionScope, SplitRequest, SplitSettings};
use std::path::PathBuf;

/// Options describing one split
#[derive(Args, Debug, Clone)]
pub struct SplitOptions {
    /// Directory path for the repository to split
    #[arg(short = 'r', long = "repo", value_name = "PATH")]
    pub repo: PathBuf,

    /// Name of the new repository, created next to the one being split
    #[arg(short = 's', long = "srepo", value_name = "NAME")]
    pub split_repo: String,

    /// Directories to keep in the new repository, separated by a space
    #[arg(short = 'd', long = "dir", value_name = "DIRS", required = true, num_args = 1..)]
    pub dirs: Vec<String>,

    /// Keep only the named directories themselves; their subdirectories are removed
    #[arg(long)]
    pub exact: bool,

    /// Message for the commit that records the removal
    #[arg(long, value_name = "MESSAGE")]
    pub commit_message: Option<String>,

    /// Skip garbage collection at the end
    #[arg(long)]
    pub no_gc: bool,

    /// Config file (default: <config dir>/reposplit/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl SplitOptions {
    /// Retain entries, splitting space-separated values
    pub fn retain_list(&self) -> Vec<String> {
        self.dirs
            .iter()
            .flat_map(|value| value.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    pub fn scope(&self) -> RetentionScope {
        if self.exact {
            RetentionScope::Exact
        } else {
            RetentionScope::Subtree
        }
    }

    pub fn request(&self) -> SplitRequest {
        SplitRequest {
            source: self.repo.clone(),
            new_name: self.split_repo.clone(),
            retain: self.retain_list(),
            scope: self.scope(),
        }
    }

    /// Config file settings with command-line overrides applied
    pub fn settings(&self) -> Result<SplitSettings> {
        let mut settings = config::load(self.config.as_deref())?;
        if let Some(message) = &self.commit_message {
            settings.commit_message = message.clone();
        }
        if self.no_gc {
            settings.run_gc = false;
        }
        Ok(settings)
    }
}
