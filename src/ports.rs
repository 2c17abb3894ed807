//! Capability traits abstracting every process and filesystem side effect away from
//! the engine, so probe/apply/checkpoint logic can run against fakes.

use std::path::{Path, PathBuf};

use crate::types::Direction;
use crate::util::exec::{CommandResult, ExecRequest};

/// Runs one external command to completion.
pub trait CommandRunner {
    fn run(&self, request: &ExecRequest) -> anyhow::Result<CommandResult>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, request: &ExecRequest) -> anyhow::Result<CommandResult> {
        (**self).run(request)
    }
}

/// Version-control primitives used for checkpoints.
pub trait Vcs {
    fn is_repository(&self, root: &Path) -> bool;
    /// Stage everything, including untracked files.
    fn stage_all(&self, root: &Path) -> anyhow::Result<()>;
    /// Commit all staged and tracked changes; succeeds on a clean tree too.
    fn commit_all(&self, root: &Path, message: &str) -> anyhow::Result<()>;
    /// Point `label` at HEAD, replacing any previous target.
    fn tag_force(&self, root: &Path, label: &str) -> anyhow::Result<()>;
    /// Resolve a revision to a commit id; `None` when it does not resolve.
    fn resolve(&self, root: &Path, rev: &str) -> anyhow::Result<Option<String>>;
    fn reset_hard(&self, root: &Path, rev: &str) -> anyhow::Result<()>;
    /// Remove untracked files and directories.
    fn clean_untracked(&self, root: &Path) -> anyhow::Result<()>;
    /// Paths left with unresolved merge conflicts.
    fn unmerged_paths(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>>;
}

/// The patch-application primitive. `Ok(false)` means the tool ran and reported failure.
pub trait PatchTool {
    /// Check applicability without writing anything. `fuzz: None` keeps the tool default.
    fn dry_run(
        &self,
        root: &Path,
        patch: &Path,
        direction: Direction,
        fuzz: Option<u32>,
    ) -> anyhow::Result<bool>;
    /// Full-context apply allowing a three-way merge.
    fn merge_apply(&self, root: &Path, patch: &Path) -> anyhow::Result<bool>;
    /// Apply in `direction` tolerating `fuzz` mismatched context lines per hunk. Hunks that
    /// look already done in that direction are refused rather than flipped.
    fn fuzzy_apply(
        &self,
        root: &Path,
        patch: &Path,
        direction: Direction,
        fuzz: u32,
    ) -> anyhow::Result<bool>;
}

/// Finds and removes reject files left by a failed apply.
pub trait RejectScanner {
    fn find_rejects(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>>;
    /// First `max_chars` characters of an artifact, if readable.
    fn excerpt(&self, path: &Path, max_chars: usize) -> Option<String>;
    /// Delete every reject file; returns how many were removed.
    fn remove_rejects(&self, root: &Path) -> anyhow::Result<usize>;
}

/// Yes/no confirmation from the operator.
pub trait Prompter {
    fn confirm(&self, question: &str) -> bool;
}
