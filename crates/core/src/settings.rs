//! Tunables for a split

use serde::{Deserialize, Serialize};

/// Message of the commit recording the ignore-file change
pub const DEFAULT_COMMIT_MESSAGE: &str =
    "Removed unnecessary directories from git history and added them to .gitignore";

/// Split settings, usually loaded from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSettings {
    /// Executable used for every version-control command
    pub git_program: String,
    /// Top-level metadata directory that is never pruned
    pub metadata_dir: String,
    /// Remote removed from the new clone
    pub remote_name: String,
    /// Ignore file that receives the pruned directories
    pub ignore_file: String,
    /// Message of the final commit
    pub commit_message: String,
    /// Run garbage collection at the end
    pub run_gc: bool,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            metadata_dir: ".git".to_string(),
            remote_name: "origin".to_string(),
            ignore_file: ".gitignore".to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            run_gc: true,
        }
    }
}

impl SplitSettings {
    /// Reject blank values
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("git_program", &self.git_program),
            ("metadata_dir", &self.metadata_dir),
            ("remote_name", &self.remote_name),
            ("ignore_file", &self.ignore_file),
            ("commit_message", &self.commit_message),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", name));
            }
        }
        if self.metadata_dir.contains(['/', '\\']) {
            return Err("metadata_dir must be a single directory name".to_string());
        }
        Ok(())
    }
}
