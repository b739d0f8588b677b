//! Source repository fixtures
//!
//! Builds a throwaway monorepo inside a temp directory. The split
//! destination is created next to it, inside the same temp directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Directory layout used by most workflow tests
pub const MONOREPO_LAYOUT: &[&str] = &[
    "abc/def/ghi",
    "abc/def/xyz",
    "abc/def/wtf",
    "foo/bar",
    "foo/blah",
    "db",
];

/// Environment that makes git deterministic and independent of the host
/// user's configuration
pub fn git_env() -> [(&'static str, &'static str); 6] {
    [
        ("GIT_AUTHOR_NAME", "Reposplit Tests"),
        ("GIT_AUTHOR_EMAIL", "tests@reposplit.invalid"),
        ("GIT_COMMITTER_NAME", "Reposplit Tests"),
        ("GIT_COMMITTER_EMAIL", "tests@reposplit.invalid"),
        ("GIT_CONFIG_NOSYSTEM", "1"),
        ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ]
}

/// Whether a usable git executable is on `PATH`
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` and return its standard output
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(git_env())
        .output()
        .with_context(|| format!("Failed to run git {:?}", args))?;

    if !output.status.success() {
        anyhow::bail!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// A monorepo on disk, optionally under version control
pub struct SourceRepo {
    _temp: TempDir,
    /// Parent directory of the monorepo; split destinations land here
    pub parent: PathBuf,
    /// The monorepo itself
    pub root: PathBuf,
}

impl SourceRepo {
    /// Create `mono/` with one file in every listed directory
    pub fn with_dirs(dirs: &[&str]) -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let parent = temp.path().canonicalize()?;
        let root = parent.join("mono");
        fs::create_dir(&root)?;

        let repo = Self {
            _temp: temp,
            parent,
            root,
        };
        for dir in dirs {
            repo.write_file(&format!("{}/file.txt", dir), dir)?;
        }
        Ok(repo)
    }

    /// The standard monorepo layout, committed to git
    pub fn committed() -> Result<Self> {
        let repo = Self::with_dirs(MONOREPO_LAYOUT)?;
        repo.git(&["init", "-q"])?;
        repo.commit_all("Initial layout")?;
        Ok(repo)
    }

    pub fn write_file(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.root.join(relative);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, contents)?;
        Ok(())
    }

    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-q", "-m", message])?;
        Ok(())
    }

    pub fn git(&self, args: &[&str]) -> Result<String> {
        git(&self.root, args)
    }

    /// Where a split named `name` is created
    pub fn destination(&self, name: &str) -> PathBuf {
        self.parent.join(name)
    }
}
