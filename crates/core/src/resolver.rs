//! Turns a raw retain list and directory listing into a prune set

use crate::error::{PathError, ValidationError};
use crate::path::RepoPath;
use crate::tree::DirectoryTree;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How far a retain entry reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionScope {
    /// A retained directory keeps everything beneath it
    #[default]
    Subtree,
    /// A retained directory keeps only itself; its subdirectories are prunable
    Exact,
}

/// Ordered, de-duplicated set of directories to purge from history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneSet {
    paths: Vec<RepoPath>,
}

impl PruneSet {
    pub fn paths(&self) -> &[RepoPath] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// One anchored ignore entry per pruned path (`/db/`, `/foo/blah/`)
    pub fn ignore_entries(&self) -> Vec<String> {
        self.paths.iter().map(RepoPath::to_ignore_pattern).collect()
    }
}

impl From<Vec<RepoPath>> for PruneSet {
    fn from(paths: Vec<RepoPath>) -> Self {
        Self { paths }
    }
}

impl<'a> IntoIterator for &'a PruneSet {
    type Item = &'a RepoPath;
    type IntoIter = std::slice::Iter<'a, RepoPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Applies a retain list to a directory listing
#[derive(Debug, Clone)]
pub struct RetentionResolver {
    metadata_dir: String,
    scope: RetentionScope,
}

impl RetentionResolver {
    pub fn new(metadata_dir: impl Into<String>, scope: RetentionScope) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            scope,
        }
    }

    pub fn scope(&self) -> RetentionScope {
        self.scope
    }

    /// Compute the prune set
    ///
    /// Fails with `NoRetentionTargets` if `retain_list` is empty, and with
    /// `InvalidPath` if any retain entry is malformed. Listed directories
    /// are never rejected.
    /// Retain entries absent from the listing are logged, not rejected.
    pub fn resolve<R, L>(&self, retain_list: R, listing: L) -> Result<PruneSet, ValidationError>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        let retain = retain_list
            .into_iter()
            .map(|raw| RepoPath::normalize(raw.as_ref()))
            .collect::<Result<Vec<_>, PathError>>()?;
        if retain.is_empty() {
            return Err(ValidationError::NoRetentionTargets);
        }

        // Listed names come from the filesystem and are taken verbatim
        let directories = listing
            .into_iter()
            .filter_map(|raw| RepoPath::from_listing_entry(raw.as_ref()));

        let mut tree = DirectoryTree::from_listing(directories);
        debug!("Built directory tree with {} nodes", tree.len());

        if !tree.mark_vcs_metadata_retained(&self.metadata_dir) {
            debug!("No {} directory in listing", self.metadata_dir);
        }

        for path in &retain {
            let listed = match self.scope {
                RetentionScope::Subtree => tree.mark_subtree_retained(path),
                RetentionScope::Exact => tree.mark_retained(path),
            };
            if !listed {
                warn!("Retained directory {} does not exist in the repository", path);
            }
        }

        let prune_set = PruneSet::from(tree.compute_prune_set());
        debug!("{} directories to prune", prune_set.len());
        Ok(prune_set)
    }
}
