//! Invalid invocations fail before anything is cloned

use crate::common::SourceRepo;
use crate::reposplit;
use anyhow::Result;

#[test]
fn test_missing_arguments_print_usage() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src"])?;

    let result = reposplit!(&repo.parent, "-r", "mono").assert_failure()?;
    assert!(result.contains_stderr("Usage"));
    assert!(result.contains_stderr("--srepo"));
    Ok(())
}

#[test]
fn test_existing_destination_is_rejected() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src", "docs"])?;
    let destination = repo.destination("split");
    std::fs::create_dir(&destination)?;

    let result = reposplit!(&repo.parent, "-r", "mono", "-s", "split", "-d", "src").assert_failure()?;

    assert!(result.contains_stderr("already exists"));
    assert_eq!(std::fs::read_dir(&destination)?.count(), 0);
    Ok(())
}

#[test]
fn test_blank_dir_list_is_rejected() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src"])?;

    let result = reposplit!(&repo.parent, "-r", "mono", "-s", "split", "-d", "   ").assert_failure()?;

    assert!(result.contains_stderr("no directories will be retained"));
    assert!(!repo.destination("split").exists());
    Ok(())
}

#[test]
fn test_missing_source_is_rejected() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src"])?;

    let result = reposplit!(&repo.parent, "-r", "nowhere", "-s", "split", "-d", "src").assert_failure()?;

    assert!(result.contains_stderr("does not exist"));
    assert!(!repo.destination("split").exists());
    Ok(())
}

#[test]
fn test_nested_name_is_rejected() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src"])?;

    let result = reposplit!(&repo.parent, "-r", "mono", "-s", "a/b", "-d", "src").assert_failure()?;

    assert!(result.contains_stderr("single directory name"));
    Ok(())
}

#[test]
fn test_unreadable_config_is_reported() -> Result<()> {
    let repo = SourceRepo::with_dirs(&["src"])?;
    let config = repo.parent.join("bad.toml");
    std::fs::write(&config, "[split]\ngit_program = \"\"\n")?;

    let mut cmd = reposplit!(&repo.parent, "-r", "mono", "-s", "split", "-d", "src", "--config");
    cmd.arg_path(&config);
    let result = cmd.assert_failure()?;

    assert!(result.contains_stderr("Invalid config file"));
    assert!(!repo.destination("split").exists());
    Ok(())
}
