use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::{probe, Applier, DEFAULT_FUZZ};
use crate::errors::{PatchError, PatchResult};
use crate::orchestrator::{Event, NoProgress, Progress};
use crate::patches::PatchFile;
use crate::ports::{PatchTool, RejectScanner, Vcs};
use crate::run_context::RunContext;
use crate::types::{ApplyOutcome, Direction, PatchState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub patch: PatchFile,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One entry per attempted patch, in order; the halting patch is last.
    pub entries: Vec<BatchEntry>,
    /// Index into `entries` of the patch that stopped the run.
    pub halted_at: Option<usize>,
    pub elapsed: Duration,
    pub total: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> bool {
        self.halted_at.is_none()
    }

    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    pub fn halting_entry(&self) -> Option<&BatchEntry> {
        self.halted_at.and_then(|i| self.entries.get(i))
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == ApplyOutcome::AlreadyApplied)
            .count()
    }
}

/// Ordered application of a whole patch set, without checkpoints.
pub struct BatchApply<'a> {
    tool: &'a dyn PatchTool,
    vcs: &'a dyn Vcs,
    rejects: &'a dyn RejectScanner,
    progress: &'a dyn Progress,
    fuzz: u32,
    direction: Direction,
}

impl<'a> BatchApply<'a> {
    pub fn new(tool: &'a dyn PatchTool, vcs: &'a dyn Vcs, rejects: &'a dyn RejectScanner) -> Self {
        Self {
            tool,
            vcs,
            rejects,
            progress: &NoProgress,
            fuzz: DEFAULT_FUZZ,
            direction: Direction::Forward,
        }
    }

    pub fn with_fuzz(mut self, fuzz: u32) -> Self {
        self.fuzz = fuzz;
        self
    }

    /// `Reverse` takes the set back out, last patch first.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Apply `patches` in the given order, stopping at the first `Rejected` or `Failed`.
    /// In reverse the order is walked backwards.
    ///
    /// Only an interrupt ends the run with `Err`; tool failures become `Failed` entries.
    pub fn run(
        &self,
        ctx: &RunContext,
        root: &Path,
        patches: &[PatchFile],
    ) -> PatchResult<BatchReport> {
        let applier = Applier::new(self.tool, self.vcs, self.rejects)
            .with_fuzz(self.fuzz)
            .with_direction(self.direction)
            .with_interrupt(ctx.interrupt().clone());
        let mut entries = Vec::with_capacity(patches.len());
        let mut halted_at = None;

        let ordered: Box<dyn Iterator<Item = &PatchFile>> = match self.direction {
            Direction::Forward => Box::new(patches.iter()),
            Direction::Reverse => Box::new(patches.iter().rev()),
        };
        for patch in ordered {
            ctx.interrupt().check()?;
            let outcome = self.apply_one(ctx, &applier, root, patch)?;
            let halt = matches!(outcome, ApplyOutcome::Rejected(_) | ApplyOutcome::Failed(_));
            entries.push(BatchEntry {
                patch: patch.clone(),
                outcome,
            });
            if halt {
                warn!(patch = %patch, "halting batch");
                halted_at = Some(entries.len() - 1);
                break;
            }
        }

        let report = BatchReport {
            entries,
            halted_at,
            elapsed: ctx.elapsed(),
            total: patches.len(),
        };
        info!(
            attempted = report.entries.len(),
            total = report.total,
            skipped = report.skipped(),
            direction = ?self.direction,
            ok = report.succeeded(),
            "batch finished"
        );
        Ok(report)
    }

    fn apply_one(
        &self,
        ctx: &RunContext,
        applier: &Applier<'_>,
        root: &Path,
        patch: &PatchFile,
    ) -> PatchResult<ApplyOutcome> {
        let path = patch.path();
        // The reverse applier does its own presence check through dry runs.
        if self.direction == Direction::Forward {
            let state = match probe(self.tool, root, path) {
                Ok(state) => state,
                Err(e) => return failed(ctx, e),
            };
            if state == PatchState::AlreadyApplied {
                self.skip(path);
                return Ok(ApplyOutcome::AlreadyApplied);
            }
        }

        self.progress.event(&Event::Applying { patch: path });
        let outcome = match applier.apply(root, path) {
            Ok(outcome) => outcome,
            Err(e) => return failed(ctx, e),
        };
        if self.direction == Direction::Reverse && outcome == ApplyOutcome::AlreadyApplied {
            self.skip(path);
        } else {
            self.progress.event(&Event::Applied {
                patch: path,
                outcome: &outcome,
            });
        }
        Ok(outcome)
    }

    fn skip(&self, patch: &Path) {
        self.progress.event(&Event::Skipped {
            patch,
            direction: self.direction,
        });
    }
}

/// Tool errors halt the batch as `Failed`; a child that died to Ctrl-C ends the run.
fn failed(ctx: &RunContext, err: PatchError) -> PatchResult<ApplyOutcome> {
    match ctx.interrupt().attribute(err) {
        PatchError::Interrupted => Err(PatchError::Interrupted),
        e => Ok(ApplyOutcome::Failed(e.to_string())),
    }
}
