//! Core of the repository splitter
//!
//! This crate provides:
//! - Normalized repository-relative paths
//! - A directory tree with upward retention propagation
//! - Retain-list resolution into a minimal prune set
//! - The version-control backend seam and the git commands a split issues
//! - The split pipeline itself

pub mod backend;
pub mod enumerate;
pub mod error;
pub mod path;
pub mod resolver;
pub mod settings;
pub mod split;
pub mod tree;

// Re-exports
pub use backend::{GitCommand, OutputLines, VcsBackend};
pub use enumerate::{DirectoryEnumerator, WalkDirEnumerator, WorkingCopyEnumerator};
pub use error::{ExternalToolError, PathError, Result, SplitError, ValidationError};
pub use path::RepoPath;
pub use resolver::{PruneSet, RetentionResolver, RetentionScope};
pub use settings::SplitSettings;
pub use split::{
    NoopListener, ProgressListener, SplitFailure, SplitOrchestrator, SplitPlan, SplitReport,
    SplitRequest, SplitStage, SplitState,
};
pub use tree::DirectoryTree;
