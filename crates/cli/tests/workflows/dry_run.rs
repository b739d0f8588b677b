//! `--dry-run` reports the prune set without touching the filesystem

use crate::common::SourceRepo;
use crate::reposplit;
use anyhow::Result;

#[test]
fn test_dry_run_lists_pruned_directories() -> Result<()> {
    let repo = SourceRepo::with_dirs(crate::common::fixtures::MONOREPO_LAYOUT)?;

    let result = reposplit!(
        &repo.parent,
        "--dry-run",
        "-r",
        "mono",
        "-s",
        "split",
        "-d",
        "abc/def/ghi foo/bar abc/def/xyz"
    )
    .assert_success()?;

    assert_eq!(
        result.listed_patterns(),
        vec!["db/", "foo/blah/", "abc/def/wtf/"]
    );
    assert!(result.contains_stdout("filter-branch"));
    assert!(!repo.destination("split").exists());
    Ok(())
}

#[test]
fn test_dry_run_exact_scope_prunes_subdirectories() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["app/src", "app/tests", "lib"])?;

    let result = reposplit!(
        &repo.parent,
        "--dry-run",
        "--exact",
        "-r",
        "mono",
        "-s",
        "split",
        "-d",
        "app"
    )
    .assert_success()?;

    assert_eq!(
        result.listed_patterns(),
        vec!["lib/", "app/src/", "app/tests/"]
    );
    Ok(())
}

#[test]
fn test_dry_run_with_nothing_to_prune() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src", "docs"])?;

    let result = reposplit!(&repo.parent, "--dry-run", "-r", "mono", "-s", "split", "-d", "src", "docs")
        .assert_success()?;

    assert!(result.listed_patterns().is_empty());
    assert!(result.contains_stdout("No directories would be removed"));
    Ok(())
}

#[test]
fn test_dry_run_skips_ignored_directories() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src", "docs"])?;
    repo.write_file(".gitignore", "target/\nnode_modules/\n")?;
    repo.write_file("target/debug/app", "binary")?;
    repo.write_file("node_modules/left-pad/index.js", "module.exports = 1;")?;

    let result = reposplit!(&repo.parent, "--dry-run", "-r", "mono", "-s", "split", "-d", "src")
        .assert_success()?;

    assert_eq!(result.listed_patterns(), vec!["docs/"]);
    Ok(())
}
