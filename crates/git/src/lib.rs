//! Process-backed git integration
//!
//! This crate provides:
//! - [`GitCli`], a [`VcsBackend`] that spawns the git executable
//! - Line-by-line streaming of standard output while the process runs
//! - Exit status checking once the output is exhausted

use split_core::backend::{OutputLines, VcsBackend};
use split_core::error::{ExternalToolError, Result, SplitError};
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, warn};

/// Environment applied to every invocation
///
/// filter-branch otherwise prints a deprecation notice and sleeps before
/// rewriting.
const DEFAULT_ENV: [(&str, &str); 1] = [("FILTER_BRANCH_SQUELCH_WARNING", "1")];

/// Runs git as a child process
///
/// Standard error is inherited so git's own progress and diagnostics reach
/// the terminal; standard output is streamed to the caller.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    env: Vec<(String, String)>,
}

impl GitCli {
    /// Use `git` from `PATH`
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            env: DEFAULT_ENV
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Add an environment variable for every invocation
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn describe(&self, args: &[String]) -> String {
        if args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, args.join(" "))
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl VcsBackend for GitCli {
    fn execute<'a>(&'a self, working_dir: &Path, args: &[String]) -> Result<OutputLines<'a>> {
        let command = self.describe(args);
        debug!("Spawning `{}` in {}", command, working_dir.display());

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ExternalToolError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SplitError::from(ExternalToolError::Read {
                    command,
                    source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout not captured"),
                }));
            }
        };

        Ok(Box::new(ProcessLines {
            command,
            child,
            lines: BufReader::new(stdout).lines(),
            finished: false,
        }))
    }
}

/// Output lines of a running child, checked for exit status at the end
struct ProcessLines {
    command: String,
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    finished: bool,
}

impl ProcessLines {
    fn finish(&mut self) -> Option<Result<String>> {
        self.finished = true;
        match self.child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(ExternalToolError::Exit {
                command: self.command.clone(),
                status: status.to_string(),
            }
            .into())),
            Err(source) => Some(Err(ExternalToolError::Read {
                command: self.command.clone(),
                source,
            }
            .into())),
        }
    }
}

impl Iterator for ProcessLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.lines.next() {
            Some(Ok(line)) => Some(Ok(line)),
            Some(Err(source)) => {
                self.finished = true;
                let _ = self.child.kill();
                let _ = self.child.wait();
                Some(Err(ExternalToolError::Read {
                    command: self.command.clone(),
                    source,
                }
                .into()))
            }
            None => self.finish(),
        }
    }
}

// Reap the child if the caller stops reading early.
impl Drop for ProcessLines {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Output of `{}` abandoned before completion", self.command);
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
