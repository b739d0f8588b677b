//! Normalized repository-relative directory paths
//!
//! A [`RepoPath`] is always forward-slash delimited, has no leading or
//! trailing separator and no `.`/`..` segments. The repository root is the
//! empty path. Comparison is exact and case-sensitive.

use crate::error::PathError;
use std::cmp::Ordering;
use std::fmt;

/// Separator used in normalized paths
pub const SEPARATOR: char = '/';

/// Normalized relative directory path
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPath(String);

impl RepoPath {
    /// The repository root (empty path)
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize a raw platform path
    ///
    /// Backslashes become `/`, repeated separators and `.` segments collapse,
    /// and a trailing separator is dropped. Empty input, absolute input and
    /// input containing `..` are rejected.
    pub fn normalize(raw: &str) -> Result<Self, PathError> {
        let unified = raw.replace('\\', "/");
        if unified.trim().is_empty() {
            return Err(PathError::Empty);
        }
        if unified.starts_with(SEPARATOR) || has_drive_prefix(&unified) {
            return Err(PathError::Absolute(raw.to_string()));
        }

        let mut segments = Vec::new();
        for segment in unified.split(SEPARATOR) {
            match segment {
                "" | "." => continue,
                ".." => return Err(PathError::ParentTraversal(raw.to_string())),
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments.join("/")))
    }

    /// Build a path from segments the filesystem already produced
    ///
    /// No validation beyond skipping empty segments: directory names that
    /// look like drive prefixes, contain backslashes or are all spaces are
    /// kept verbatim. `None` if no segment remains.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(SEPARATOR);
            }
            out.push_str(segment);
        }
        if out.is_empty() {
            None
        } else {
            Some(Self(out))
        }
    }

    /// A `/`-separated entry from a directory listing, taken verbatim
    pub fn from_listing_entry(raw: &str) -> Option<Self> {
        Self::from_segments(raw.split(SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate path segments from the top down (empty for the root)
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments; the root has depth 0
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches(SEPARATOR).count() + 1
        }
    }

    /// Last segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        })
    }

    /// Parent path, `None` for the root
    pub fn parent(&self) -> Option<RepoPath> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind(SEPARATOR) {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        })
    }

    /// Append one segment (must not contain a separator)
    pub fn join(&self, segment: &str) -> RepoPath {
        debug_assert!(!segment.is_empty() && !segment.contains(SEPARATOR));
        if self.is_root() {
            Self(segment.to_string())
        } else {
            Self(format!("{}/{}", self.0, segment))
        }
    }

    /// True if `other` equals `self` or lies beneath it
    ///
    /// The root is an ancestor of every path. `abc` is an ancestor of
    /// `abc/def` but not of `abcdef`.
    pub fn is_ancestor_of(&self, other: &RepoPath) -> bool {
        if self.is_root() || self.0 == other.0 {
            return true;
        }
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// Render as a directory pattern for display (`abc/def/`)
    pub fn to_dir_pattern(&self) -> String {
        format!("{}{}", self.0, SEPARATOR)
    }

    /// Render as an ignore-file entry matching this directory only
    ///
    /// The entry is anchored to the repository root (`/abc/def/`) and glob
    /// or escape characters in names are backslash-escaped, so `a*` never
    /// matches `abc` and `lib` never matches `src/lib`.
    pub fn to_ignore_pattern(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        out.push(SEPARATOR);
        for ch in self.0.chars() {
            if matches!(ch, '*' | '?' | '[' | '\\' | '!' | '#') {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push(SEPARATOR);
        out
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RepoPath {
    type Error = PathError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        RepoPath::normalize(raw)
    }
}

/// Shallowest first, then lexical
pub fn depth_then_lexical(a: &RepoPath, b: &RepoPath) -> Ordering {
    a.depth().cmp(&b.depth()).then_with(|| a.0.cmp(&b.0))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
