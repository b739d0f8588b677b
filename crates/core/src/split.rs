//! End-to-end split pipeline
//!
//! The split runs as a strict forward sequence of stages:
//!
//! ```text
//! Validate -> Clone -> Detach -> ComputePruneSet -> RewriteHistory
//!          -> Ignore -> Commit -> Gc -> Done
//! ```
//!
//! The first error moves the pipeline to `Failed` and stops it. Nothing is
//! retried and nothing is rolled back: after `Clone` the destination is left
//! as the last successful stage produced it.

use crate::backend::{GitCommand, VcsBackend};
use crate::enumerate::{DirectoryEnumerator, WalkDirEnumerator, WorkingCopyEnumerator};
use crate::error::{Result, SplitError, ValidationError};
use crate::path::RepoPath;
use crate::resolver::{PruneSet, RetentionResolver, RetentionScope};
use crate::settings::SplitSettings;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitStage {
    Validate,
    Clone,
    Detach,
    ComputePruneSet,
    RewriteHistory,
    Ignore,
    Commit,
    Gc,
}

impl SplitStage {
    /// Every stage in execution order
    pub const ALL: [SplitStage; 8] = [
        SplitStage::Validate,
        SplitStage::Clone,
        SplitStage::Detach,
        SplitStage::ComputePruneSet,
        SplitStage::RewriteHistory,
        SplitStage::Ignore,
        SplitStage::Commit,
        SplitStage::Gc,
    ];

    /// Stage that follows this one, `None` after the last
    pub fn next(self) -> Option<SplitStage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            SplitStage::Validate => "validate",
            SplitStage::Clone => "clone",
            SplitStage::Detach => "detach",
            SplitStage::ComputePruneSet => "compute prune set",
            SplitStage::RewriteHistory => "rewrite history",
            SplitStage::Ignore => "ignore",
            SplitStage::Commit => "commit",
            SplitStage::Gc => "gc",
        }
    }
}

impl fmt::Display for SplitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the pipeline currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitState {
    /// Not started yet
    Idle,
    /// Executing a stage
    Running(SplitStage),
    /// All stages completed or skipped
    Done,
    /// Stopped at `stage`
    Failed { stage: SplitStage, reason: String },
}

/// What the caller wants split off
#[derive(Debug, Clone)]
pub struct SplitRequest {
    /// Working copy of the repository to split
    pub source: PathBuf,
    /// Name of the new repository, created next to `source`
    pub new_name: String,
    /// Directories to keep, as typed by the user
    pub retain: Vec<String>,
    pub scope: RetentionScope,
}

/// Receives pipeline progress as it happens
///
/// All methods default to doing nothing.
pub trait ProgressListener {
    fn stage_started(&mut self, _stage: SplitStage) {}

    fn stage_finished(&mut self, _stage: SplitStage) {}

    fn stage_skipped(&mut self, _stage: SplitStage, _reason: &str) {}

    /// About to run an external command
    fn command(&mut self, _stage: SplitStage, _command: &GitCommand) {}

    /// One line of external command output
    fn output_line(&mut self, _stage: SplitStage, _line: &str) {}
}

/// Listener that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ProgressListener for NoopListener {}

/// Outcome of a completed split
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub destination: PathBuf,
    pub prune_set: PruneSet,
    pub completed: Vec<SplitStage>,
    pub skipped: Vec<SplitStage>,
}

/// Outcome of a dry run
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub destination: PathBuf,
    pub prune_set: PruneSet,
    /// History rewrite that a real split would run, `None` if nothing is pruned
    pub rewrite: Option<GitCommand>,
}

/// A split stopped at `stage`
#[derive(Debug, thiserror::Error)]
#[error("split failed during {stage}")]
pub struct SplitFailure {
    pub stage: SplitStage,
    #[source]
    pub error: SplitError,
    /// Destination, once known; may hold a partially split repository
    pub destination: Option<PathBuf>,
}

enum StepOutcome {
    Completed,
    Skipped(&'static str),
}

#[derive(Debug, Default)]
struct SplitContext {
    source: PathBuf,
    destination: Option<PathBuf>,
    parent: PathBuf,
    prune_set: PruneSet,
}

impl SplitContext {
    fn destination(&self) -> &Path {
        self.destination.as_deref().unwrap_or(Path::new(""))
    }
}

/// Drives a split through the version-control backend
pub struct SplitOrchestrator<B, E = WalkDirEnumerator> {
    backend: B,
    enumerator: E,
    settings: SplitSettings,
    state: SplitState,
}

impl<B: VcsBackend> SplitOrchestrator<B, WalkDirEnumerator> {
    pub fn new(backend: B, settings: SplitSettings) -> Self {
        Self::with_enumerator(backend, WalkDirEnumerator, settings)
    }
}

impl<B: VcsBackend, E: DirectoryEnumerator> SplitOrchestrator<B, E> {
    pub fn with_enumerator(backend: B, enumerator: E, settings: SplitSettings) -> Self {
        Self {
            backend,
            enumerator,
            settings,
            state: SplitState::Idle,
        }
    }

    pub fn state(&self) -> &SplitState {
        &self.state
    }

    pub fn settings(&self) -> &SplitSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run every stage in order, stopping at the first failure
    pub fn run(
        &mut self,
        request: &SplitRequest,
        listener: &mut dyn ProgressListener,
    ) -> std::result::Result<SplitReport, SplitFailure> {
        let mut ctx = SplitContext::default();
        let mut completed = Vec::new();
        let mut skipped = Vec::new();
        let mut stage = SplitStage::Validate;

        loop {
            self.state = SplitState::Running(stage);
            info!("Split stage: {}", stage);
            listener.stage_started(stage);

            match self.step(stage, request, &mut ctx, listener) {
                Ok(StepOutcome::Completed) => {
                    listener.stage_finished(stage);
                    completed.push(stage);
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    info!("Skipped {}: {}", stage, reason);
                    listener.stage_skipped(stage, reason);
                    skipped.push(stage);
                }
                Err(error) => return Err(self.fail(stage, error, ctx.destination)),
            }

            match stage.next() {
                Some(next) => stage = next,
                None => break,
            }
        }

        self.state = SplitState::Done;
        Ok(SplitReport {
            destination: ctx.destination.unwrap_or_default(),
            prune_set: ctx.prune_set,
            completed,
            skipped,
        })
    }

    /// Validate and compute the prune set against the source working copy
    ///
    /// Nothing is cloned or written. Directories the source ignores are left
    /// out because a clone would not contain them; untracked directories that
    /// are not ignored still show up here but not in a real split.
    pub fn plan(&mut self, request: &SplitRequest) -> std::result::Result<SplitPlan, SplitFailure> {
        let mut ctx = SplitContext::default();

        self.state = SplitState::Running(SplitStage::Validate);
        let source = match self.validate(request, &mut ctx) {
            Ok(source) => source,
            Err(error) => return Err(self.fail(SplitStage::Validate, error, None)),
        };

        self.state = SplitState::Running(SplitStage::ComputePruneSet);
        let prune_set = match self.compute_prune_set(&WorkingCopyEnumerator, &source, request) {
            Ok(set) => set,
            Err(error) => {
                return Err(self.fail(SplitStage::ComputePruneSet, error, ctx.destination))
            }
        };

        self.state = SplitState::Done;
        let rewrite = (!prune_set.is_empty()).then(|| GitCommand::FilterIndex {
            paths: prune_set.paths().to_vec(),
        });
        Ok(SplitPlan {
            destination: ctx.destination.unwrap_or_default(),
            prune_set,
            rewrite,
        })
    }

    fn fail(&mut self, stage: SplitStage, error: SplitError, destination: Option<PathBuf>) -> SplitFailure {
        self.state = SplitState::Failed {
            stage,
            reason: error.to_string(),
        };
        SplitFailure {
            stage,
            error,
            destination,
        }
    }

    fn step(
        &self,
        stage: SplitStage,
        request: &SplitRequest,
        ctx: &mut SplitContext,
        listener: &mut dyn ProgressListener,
    ) -> Result<StepOutcome> {
        match stage {
            SplitStage::Validate => {
                self.validate(request, ctx)?;
            }
            SplitStage::Clone => {
                let cmd = GitCommand::Clone {
                    source: ctx.source.clone(),
                    destination: ctx.destination().to_path_buf(),
                };
                self.run_git(stage, &ctx.parent, &cmd, listener)?;
            }
            SplitStage::Detach => {
                let cmd = GitCommand::RemoveRemote {
                    name: self.settings.remote_name.clone(),
                };
                self.run_git(stage, ctx.destination(), &cmd, listener)?;
            }
            SplitStage::ComputePruneSet => {
                ctx.prune_set =
                    self.compute_prune_set(&self.enumerator, ctx.destination(), request)?;
            }
            SplitStage::RewriteHistory => {
                if ctx.prune_set.is_empty() {
                    return Ok(StepOutcome::Skipped("nothing to prune"));
                }
                self.rewrite_history(ctx, listener)?;
            }
            SplitStage::Ignore => {
                if ctx.prune_set.is_empty() {
                    return Ok(StepOutcome::Skipped("nothing to prune"));
                }
                let ignore_path = ctx.destination().join(&self.settings.ignore_file);
                append_ignore_entries(&ignore_path, &ctx.prune_set.ignore_entries())?;
            }
            SplitStage::Commit => {
                if ctx.prune_set.is_empty() {
                    return Ok(StepOutcome::Skipped("nothing to commit"));
                }
                let stage_ignore = GitCommand::Stage {
                    path: self.settings.ignore_file.clone(),
                };
                self.run_git(stage, ctx.destination(), &stage_ignore, listener)?;
                let commit = GitCommand::Commit {
                    message: self.settings.commit_message.clone(),
                };
                self.run_git(stage, ctx.destination(), &commit, listener)?;
            }
            SplitStage::Gc => {
                if !self.settings.run_gc {
                    return Ok(StepOutcome::Skipped("disabled"));
                }
                self.run_git(stage, ctx.destination(), &GitCommand::Gc, listener)?;
            }
        }
        Ok(StepOutcome::Completed)
    }

    /// Check every precondition; returns the canonical source path
    fn validate(&self, request: &SplitRequest, ctx: &mut SplitContext) -> Result<PathBuf> {
        self.settings
            .validate()
            .map_err(ValidationError::Settings)?;

        if !request.source.exists() {
            return Err(ValidationError::SourceMissing(request.source.clone()).into());
        }
        if !request.source.is_dir() {
            return Err(ValidationError::SourceNotDirectory(request.source.clone()).into());
        }

        let name = request.new_name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName.into());
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ValidationError::InvalidName(name.to_string()).into());
        }

        if request.retain.is_empty() {
            return Err(ValidationError::NoRetentionTargets.into());
        }
        for raw in &request.retain {
            RepoPath::normalize(raw)?;
        }

        let source = request
            .source
            .canonicalize()
            .map_err(|e| SplitError::fs(&request.source, e))?;
        let parent = source
            .parent()
            .ok_or_else(|| ValidationError::SourceHasNoParent(source.clone()))?
            .to_path_buf();

        let destination = parent.join(name);
        if destination.exists() {
            return Err(ValidationError::DestinationExists(destination).into());
        }

        debug!("Destination: {}", destination.display());
        ctx.source = source.clone();
        ctx.parent = parent;
        ctx.destination = Some(destination);
        Ok(source)
    }

    fn compute_prune_set<D: DirectoryEnumerator>(
        &self,
        enumerator: &D,
        root: &Path,
        request: &SplitRequest,
    ) -> Result<PruneSet> {
        let listing = enumerator.list_directories(root, "*", true)?;
        debug!("Enumerated {} directories under {}", listing.len(), root.display());

        let resolver = RetentionResolver::new(self.settings.metadata_dir.clone(), request.scope);
        let prune_set = resolver.resolve(&request.retain, listing)?;
        info!("{} directories will be removed from history", prune_set.len());
        Ok(prune_set)
    }

    fn rewrite_history(&self, ctx: &SplitContext, listener: &mut dyn ProgressListener) -> Result<()> {
        let stage = SplitStage::RewriteHistory;
        let dir = ctx.destination();

        let filter = GitCommand::FilterIndex {
            paths: ctx.prune_set.paths().to_vec(),
        };
        self.run_git(stage, dir, &filter, listener)?;

        let refs = self.capture_git(stage, dir, &GitCommand::ListBackupRefs, listener)?;
        for reference in refs.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
            let delete = GitCommand::DeleteRef {
                reference: reference.to_string(),
            };
            self.run_git(stage, dir, &delete, listener)?;
        }
        Ok(())
    }

    fn run_git(
        &self,
        stage: SplitStage,
        dir: &Path,
        command: &GitCommand,
        listener: &mut dyn ProgressListener,
    ) -> Result<()> {
        debug!("Running {} in {}", command, dir.display());
        listener.command(stage, command);
        for line in self.backend.execute(dir, &command.to_args())? {
            listener.output_line(stage, &line?);
        }
        Ok(())
    }

    fn capture_git(
        &self,
        stage: SplitStage,
        dir: &Path,
        command: &GitCommand,
        listener: &mut dyn ProgressListener,
    ) -> Result<Vec<String>> {
        debug!("Running {} in {}", command, dir.display());
        listener.command(stage, command);
        let mut lines = Vec::new();
        for line in self.backend.execute(dir, &command.to_args())? {
            let line = line?;
            listener.output_line(stage, &line);
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Append one directory pattern per line to an ignore file
///
/// Creates the file if needed and starts on a fresh line when the existing
/// content does not end with a newline.
pub fn append_ignore_entries(path: &Path, entries: &[String]) -> Result<()> {
    let fs_err = |e| SplitError::fs(path, e);

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(fs_err)?;

    let len = file.metadata().map_err(fs_err)?.len();
    let mut buf = String::new();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(fs_err)?;
        file.read_exact(&mut last).map_err(fs_err)?;
        if last[0] != b'\n' {
            buf.push('\n');
        }
    }

    for entry in entries {
        buf.push_str(entry);
        buf.push('\n');
    }
    file.write_all(buf.as_bytes()).map_err(fs_err)?;
    Ok(())
}
