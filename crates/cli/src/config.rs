//! Configuration file loading
//!
//! Settings come from a TOML file with a single `[split]` table:
//!
//! ```toml
//! [split]
//! git_program = "git"
//! commit_message = "Split out the payments service"
//! run_gc = false
//! ```
//!
//! Lookup order: explicit `--config` path, then
//! `<config dir>/reposplit/config.toml`, then built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use split_core::SplitSettings;
use std::path::{Path, PathBuf};

/// On-disk layout of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub split: SplitSettings,
}

/// Default config file location, if the platform has a config directory
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reposplit").join("config.toml"))
}

/// Load settings
///
/// An explicitly named file must exist. The default file is optional.
pub fn load(explicit: Option<&Path>) -> Result<SplitSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(SplitSettings::default()),
        },
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Parse and validate config file contents
pub fn parse(text: &str) -> Result<SplitSettings> {
    let file: ConfigFile = toml::from_str(text)?;
    file.split
        .validate()
        .map_err(|msg| anyhow::anyhow!(msg))?;
    Ok(file.split)
}
