//! Version-control backend seam and the commands the splitter issues

use crate::error::Result;
use crate::path::RepoPath;
use std::fmt;
use std::path::{Path, PathBuf};

/// Lazily produced output lines of one external command
///
/// Lines are yielded as the process writes them. An unsuccessful exit is
/// reported as a final `Err` item once the output is exhausted.
pub type OutputLines<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Executes version-control commands
///
/// Implemented by the process-backed git backend and by recording fakes in
/// tests.
pub trait VcsBackend {
    /// Start `args` in `working_dir` and stream its standard output
    fn execute<'a>(&'a self, working_dir: &Path, args: &[String]) -> Result<OutputLines<'a>>;
}

impl<T: VcsBackend + ?Sized> VcsBackend for &T {
    fn execute<'a>(&'a self, working_dir: &Path, args: &[String]) -> Result<OutputLines<'a>> {
        (**self).execute(working_dir, args)
    }
}

/// Prefix under which history rewrites keep backup refs
pub const BACKUP_REF_NAMESPACE: &str = "refs/original/";

/// A git invocation issued during a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    /// `clone <source> <destination>`
    Clone { source: PathBuf, destination: PathBuf },
    /// `remote rm <name>`
    RemoveRemote { name: String },
    /// `filter-branch --index-filter ... --prune-empty -f -- --all`
    FilterIndex { paths: Vec<RepoPath> },
    /// `for-each-ref --format=%(refname) refs/original/`
    ListBackupRefs,
    /// `update-ref -d <reference>`
    DeleteRef { reference: String },
    /// `add -- <path>`
    Stage { path: String },
    /// `commit -a -m <message>`
    Commit { message: String },
    /// `gc`
    Gc,
}

impl GitCommand {
    /// Arguments passed to the git executable
    pub fn to_args(&self) -> Vec<String> {
        match self {
            GitCommand::Clone { source, destination } => vec![
                "clone".into(),
                source.display().to_string(),
                destination.display().to_string(),
            ],
            GitCommand::RemoveRemote { name } => vec!["remote".into(), "rm".into(), name.clone()],
            GitCommand::FilterIndex { paths } => vec![
                "filter-branch".into(),
                "--index-filter".into(),
                index_filter_script(paths),
                "--prune-empty".into(),
                "-f".into(),
                "--".into(),
                "--all".into(),
            ],
            GitCommand::ListBackupRefs => vec![
                "for-each-ref".into(),
                "--format=%(refname)".into(),
                BACKUP_REF_NAMESPACE.into(),
            ],
            GitCommand::DeleteRef { reference } => {
                vec!["update-ref".into(), "-d".into(), reference.clone()]
            }
            GitCommand::Stage { path } => vec!["add".into(), "--".into(), path.clone()],
            GitCommand::Commit { message } => {
                vec!["commit".into(), "-a".into(), "-m".into(), message.clone()]
            }
            GitCommand::Gc => vec!["gc".into()],
        }
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.to_args().join(" "))
    }
}

/// Shell snippet run against every rewritten commit's index
///
/// filter-branch evaluates it with `sh`, so each path is single-quoted.
/// Pathspecs are literal: a directory named `a*` removes only itself.
pub fn index_filter_script(paths: &[RepoPath]) -> String {
    let mut script = String::from("git --literal-pathspecs rm -r -q --cached --ignore-unmatch --");
    for path in paths {
        script.push(' ');
        script.push_str(&shell_quote(path.as_str()));
    }
    script
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
