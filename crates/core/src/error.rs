//! Error taxonomy for repository splitting

use std::path::PathBuf;
use thiserror::Error;

/// A raw path string could not be turned into a [`RepoPath`](crate::RepoPath)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Input was empty, or contained only separators and `.` segments
    #[error("path is empty")]
    Empty,

    /// Input started at the filesystem root instead of the repository root
    #[error("path must be relative to the repository root: {0}")]
    Absolute(String),

    /// Input tried to climb out of the repository with `..`
    #[error("path must not contain '..': {0}")]
    ParentTraversal(String),
}

/// A precondition of the split was not met
///
/// Always raised before anything is cloned or written.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("source repository does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source repository is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("source repository has no parent directory: {}", .0.display())]
    SourceHasNoParent(PathBuf),

    #[error("the new repository name is blank")]
    BlankName,

    #[error("the new repository name must be a single directory name: {0}")]
    InvalidName(String),

    #[error("the new repository directory already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("no directories will be retained in the new repository")]
    NoRetentionTargets,

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

/// The external version-control executable misbehaved
#[derive(Debug, Error)]
pub enum ExternalToolError {
    /// Process could not be started at all (missing binary, bad working dir)
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process ran but did not exit successfully
    #[error("`{command}` exited unsuccessfully ({status})")]
    Exit { command: String, status: String },

    /// Reading the process output failed mid-stream
    #[error("failed to read output of `{command}`")]
    Read {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure that aborts a split
#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),

    #[error("filesystem error at {}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SplitError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// True when nothing was mutated before the failure
    pub fn is_validation(&self) -> bool {
        matches!(self, SplitError::Validation(_))
    }
}

impl From<PathError> for SplitError {
    fn from(err: PathError) -> Self {
        SplitError::Validation(ValidationError::InvalidPath(err))
    }
}

/// Result type for split operations
pub type Result<T> = std::result::Result<T, SplitError>;
