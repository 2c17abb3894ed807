//! Tiered application: a three-way merge first, GNU patch with fuzz second, and the
//! reject detector to tell a real conflict from a patch that was already in the tree.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::reject::{classify_failure, FailureClass};
use crate::errors::PatchResult;
use crate::interrupt::InterruptFlag;
use crate::ports::{PatchTool, RejectScanner, Vcs};
use crate::types::{ApplyOutcome, Direction};

/// Context lines per hunk the fuzzy tier may ignore.
pub const DEFAULT_FUZZ: u32 = 2;

pub struct Applier<'a> {
    tool: &'a dyn PatchTool,
    vcs: &'a dyn Vcs,
    rejects: &'a dyn RejectScanner,
    fuzz: u32,
    direction: Direction,
    interrupt: InterruptFlag,
}

impl<'a> Applier<'a> {
    pub fn new(
        tool: &'a dyn PatchTool,
        vcs: &'a dyn Vcs,
        rejects: &'a dyn RejectScanner,
    ) -> Self {
        Self {
            tool,
            vcs,
            rejects,
            fuzz: DEFAULT_FUZZ,
            direction: Direction::Forward,
            interrupt: InterruptFlag::new(),
        }
    }

    pub fn with_fuzz(mut self, fuzz: u32) -> Self {
        self.fuzz = fuzz;
        self
    }

    /// `Reverse` takes the patch back out: no merge tier, `patch -R` with fuzz only.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn fuzz(&self) -> u32 {
        self.fuzz
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Apply `patch` to the tree at `root`, stopping at the first tier that succeeds.
    ///
    /// Tool spawn failures surface as `Err(Execution)`. A tool that ran and refused the
    /// patch never does; that case ends in `Rejected` or `AlreadyApplied`.
    pub fn apply(&self, root: &Path, patch: &Path) -> PatchResult<ApplyOutcome> {
        if self.direction == Direction::Reverse {
            debug!(patch = %patch.display(), "unapplying, merge tier not used");
        } else if self.vcs.is_repository(root) {
            if let Some(outcome) = self.merge_tier(root, patch)? {
                return Ok(outcome);
            }
        } else {
            debug!(root = %root.display(), "not a repository, skipping merge tier");
        }
        self.interrupt.check()?;
        self.fuzzy_tier(root, patch)
    }

    fn merge_tier(&self, root: &Path, patch: &Path) -> PatchResult<Option<ApplyOutcome>> {
        if self.tool.merge_apply(root, patch)? {
            info!(patch = %patch.display(), "applied with three-way merge");
            return Ok(Some(ApplyOutcome::AppliedExact));
        }
        self.interrupt.check()?;
        // A partial three-way merge leaves conflict markers in place.
        let unmerged = self.vcs.unmerged_paths(root)?;
        if !unmerged.is_empty() {
            warn!(count = unmerged.len(), "three-way merge left unmerged paths");
            return Ok(Some(ApplyOutcome::Rejected(unmerged)));
        }
        warn!(fuzz = self.fuzz, "git apply failed, falling back to patch with fuzz");
        Ok(None)
    }

    fn fuzzy_tier(&self, root: &Path, patch: &Path) -> PatchResult<ApplyOutcome> {
        let (exact, fuzzy) = match self.direction {
            Direction::Forward => (ApplyOutcome::AppliedExact, ApplyOutcome::AppliedFuzzy),
            Direction::Reverse => (ApplyOutcome::Reverted, ApplyOutcome::Reverted),
        };
        let ahead = self.direction;
        if self.tool.dry_run(root, patch, ahead, Some(0))? {
            return self.run_fuzzy(root, patch, exact);
        }
        if self.tool.dry_run(root, patch, ahead, Some(self.fuzz))? {
            return self.run_fuzzy(root, patch, fuzzy);
        }
        // `--forward` would write rejects for hunks that are already done.
        if self.tool.dry_run(root, patch, ahead.flipped(), Some(self.fuzz))? {
            info!(patch = %patch.display(), ?ahead, "hunks already in requested state");
            return Ok(ApplyOutcome::AlreadyApplied);
        }
        self.interrupt.check()?;
        self.run_fuzzy(root, patch, fuzzy)
    }

    fn run_fuzzy(
        &self,
        root: &Path,
        patch: &Path,
        on_success: ApplyOutcome,
    ) -> PatchResult<ApplyOutcome> {
        if self.tool.fuzzy_apply(root, patch, self.direction, self.fuzz)? {
            info!(patch = %patch.display(), outcome = on_success.label(), "applied with patch");
            return Ok(on_success);
        }
        self.interrupt.check()?;
        Ok(match classify_failure(self.rejects, root)? {
            FailureClass::Rejected(rejects) => ApplyOutcome::Rejected(rejects),
            FailureClass::NoOpAlreadyApplied => {
                debug!("patch failed without reject files");
                ApplyOutcome::AlreadyApplied
            }
        })
    }
}

/// Paths named in a `Rejected` outcome, empty otherwise.
pub fn rejected_paths(outcome: &ApplyOutcome) -> &[PathBuf] {
    match outcome {
        ApplyOutcome::Rejected(paths) => paths,
        _ => &[],
    }
}
