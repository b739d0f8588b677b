//! Directory enumeration of a working copy

use crate::error::{Result, SplitError};
use crate::path::SEPARATOR;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Lists the directories beneath a root
pub trait DirectoryEnumerator {
    /// Relative paths (`/`-separated, no trailing separator) of directories
    /// under `root` whose name matches `pattern`
    ///
    /// `root` itself is never included. With `recursive == false` only the
    /// immediate children are listed.
    fn list_directories(&self, root: &Path, pattern: &str, recursive: bool) -> Result<Vec<String>>;
}

/// [`DirectoryEnumerator`] backed by `walkdir`
///
/// Symlinks are not followed, so a link to a directory is not listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirEnumerator;

impl DirectoryEnumerator for WalkDirEnumerator {
    fn list_directories(&self, root: &Path, pattern: &str, recursive: bool) -> Result<Vec<String>> {
        let matcher = name_matcher(root, pattern)?;
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut directories = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
        {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(root).to_path_buf();
                SplitError::fs(path, err.into())
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(matcher) = &matcher {
                if !matcher.matched(entry.file_name(), true).is_ignore() {
                    continue;
                }
            }

            let relative = entry.path().strip_prefix(root).map_err(|_| {
                SplitError::fs(
                    entry.path(),
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "outside enumeration root"),
                )
            })?;
            directories.push(relative_to_string(relative));
        }

        Ok(directories)
    }
}

/// [`DirectoryEnumerator`] over a working copy that skips ignored directories
///
/// Honors `.gitignore` files and `.git/info/exclude` under `root`, so build
/// output and other ignored directories a fresh clone would not contain are
/// left out. Untracked directories that are not ignored are still listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkingCopyEnumerator;

impl DirectoryEnumerator for WorkingCopyEnumerator {
    fn list_directories(&self, root: &Path, pattern: &str, recursive: bool) -> Result<Vec<String>> {
        let matcher = name_matcher(root, pattern)?;
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_global(false)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .follow_links(false);
        if !recursive {
            builder.max_depth(Some(1));
        }

        let mut directories = Vec::new();
        for entry in builder.build() {
            let entry = entry.map_err(|err| {
                SplitError::fs(
                    root,
                    std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
                )
            })?;
            if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }
            if let Some(matcher) = &matcher {
                if !matcher.matched(entry.file_name(), true).is_ignore() {
                    continue;
                }
            }

            if let Ok(relative) = entry.path().strip_prefix(root) {
                directories.push(relative_to_string(relative));
            }
        }

        Ok(directories)
    }
}

/// Join path components with `/` regardless of platform
pub fn relative_to_string(relative: &Path) -> String {
    let mut out = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push(SEPARATOR);
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

// `*` matches everything, so skip building a matcher for it.
fn name_matcher(root: &Path, pattern: &str) -> Result<Option<Gitignore>> {
    if pattern.is_empty() || pattern == "*" {
        return Ok(None);
    }

    let invalid = |err: ignore::Error| {
        SplitError::fs(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()),
        )
    };

    let mut builder = GitignoreBuilder::new(root);
    builder.add_line(None, pattern).map_err(invalid)?;
    builder.build().map(Some).map_err(invalid)
}
