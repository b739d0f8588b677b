//! Workflow integration tests
//!
//! Each test drives the `reposplit` binary against a monorepo on disk.

pub mod dry_run;
pub mod validation;
