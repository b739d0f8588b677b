//! CLI command execution helpers
//!
//! Wraps the `reposplit` binary built for this test run and provides
//! assertion helpers over its exit status and output. Every command runs
//! with a pinned git identity and an empty user config directory.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// CLI command builder
pub struct SplitCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl SplitCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let mut env = HashMap::new();
        for (key, value) in super::fixtures::git_env() {
            env.insert(key.to_string(), value.to_string());
        }
        // Keep the developer's own reposplit config out of the run
        let no_config = working_dir.as_ref().join(".no-config");
        env.insert(
            "XDG_CONFIG_HOME".to_string(),
            no_config.to_string_lossy().into_owned(),
        );

        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_reposplit")),
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
            env,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Add a path argument
    pub fn arg_path(&mut self, path: &Path) -> &mut Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Execute command and return its result
    pub fn execute(&self) -> Result<CommandResult> {
        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .output()
            .context("Failed to execute reposplit")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Directory patterns listed in the output, e.g. `  foo/blah/`
    pub fn listed_patterns(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter_map(|line| line.strip_prefix("  "))
            .filter(|line| line.ends_with('/'))
            .map(str::to_string)
            .collect()
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// reposplit!(dir, "-r", "mono", "-s", "split", "-d", "src").assert_success()?;
/// ```
#[macro_export]
macro_rules! reposplit {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::SplitCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_patterns() {
        let result = CommandResult {
            stdout: "Would remove from history (2):\n  db/\n  foo/blah/\n\nHistory rewrite:\n  git filter-branch\n"
                .to_string(),
            stderr: String::new(),
            exit_code: 0,
        };

        assert_eq!(result.listed_patterns(), vec!["db/", "foo/blah/"]);
    }
}
