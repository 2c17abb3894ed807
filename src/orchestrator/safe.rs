use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::{error, info};

use crate::engine::{
    probe, reject_excerpts, Applier, CheckpointManager, DEFAULT_CHECKPOINT_TAG, DEFAULT_FUZZ,
};
use crate::errors::{PatchError, PatchResult};
use crate::orchestrator::{Event, NoProgress, Progress};
use crate::ports::{PatchTool, Prompter, RejectScanner, Vcs};
use crate::run_context::RunContext;
use crate::types::{ApplyOutcome, Checkpoint, PatchState};

/// Question asked when the probe finds the patch already in the tree.
pub const CONFIRM_QUESTION: &str = "Continue anyway? [y/N]:";

/// States of a single safe apply, in the order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Probing,
    AwaitConfirm,
    Checkpointing,
    Applying,
    RevertPolicy,
    Reverting,
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The patch content is in the tree (exact, fuzzy or already present).
    Applied(ApplyOutcome),
    /// Declined at the confirmation prompt; nothing was touched.
    Aborted,
    /// Hunks could not be placed. `restored` tells whether the checkpoint was reverted.
    Rejected { rejects: Vec<PathBuf>, restored: bool },
}

#[derive(Debug, Clone)]
pub struct SafeApplyOptions {
    pub checkpoint_tag: String,
    pub fuzz: u32,
    /// Leave a failed apply in place for inspection.
    pub no_revert: bool,
}

impl Default for SafeApplyOptions {
    fn default() -> Self {
        Self {
            checkpoint_tag: DEFAULT_CHECKPOINT_TAG.to_string(),
            fuzz: DEFAULT_FUZZ,
            no_revert: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SafeApplyReport {
    pub trail: Vec<Stage>,
    pub probe: Option<PatchState>,
    pub checkpoint: Option<Checkpoint>,
    pub disposition: Disposition,
    /// Leading excerpts of the first reject files, captured before any revert.
    pub excerpts: Vec<(PathBuf, String)>,
}

impl SafeApplyReport {
    pub fn exit_code(&self) -> u8 {
        match self.disposition {
            Disposition::Applied(_) | Disposition::Aborted => 0,
            Disposition::Rejected { .. } => 1,
        }
    }

    pub fn final_stage(&self) -> Stage {
        self.trail.last().copied().unwrap_or(Stage::Idle)
    }
}

/// One patch, guarded by a checkpoint.
pub struct SafeApply<'a> {
    tool: &'a dyn PatchTool,
    vcs: &'a dyn Vcs,
    rejects: &'a dyn RejectScanner,
    prompter: &'a dyn Prompter,
    progress: &'a dyn Progress,
    options: SafeApplyOptions,
}

impl<'a> SafeApply<'a> {
    pub fn new(
        tool: &'a dyn PatchTool,
        vcs: &'a dyn Vcs,
        rejects: &'a dyn RejectScanner,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            tool,
            vcs,
            rejects,
            prompter,
            progress: &NoProgress,
            options: SafeApplyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SafeApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Run the state machine for `patch` against the repository at `root`.
    ///
    /// Conflicts come back as `Ok` with a `Rejected` disposition. `Err` is reserved for
    /// failures to run the tools at all and for interrupts; in both cases a checkpoint
    /// that was already taken is reverted first unless `no_revert` is set. A step that
    /// fails after the interrupt flag went up is reported as `Interrupted`.
    pub fn run(
        &self,
        ctx: &RunContext,
        root: &Path,
        patch: &Path,
    ) -> PatchResult<SafeApplyReport> {
        let mut trail = vec![Stage::Idle];
        let interrupt = ctx.interrupt();
        interrupt.check()?;

        trail.push(Stage::Probing);
        let state = probe(self.tool, root, patch).map_err(|e| interrupt.attribute(e))?;
        self.progress.event(&Event::Probed { patch, state });

        if state == PatchState::AlreadyApplied {
            trail.push(Stage::AwaitConfirm);
            if !self.prompter.confirm(CONFIRM_QUESTION) {
                info!(patch = %patch.display(), "declined re-apply");
                trail.push(Stage::Aborted);
                return Ok(SafeApplyReport {
                    trail,
                    probe: Some(state),
                    checkpoint: None,
                    disposition: Disposition::Aborted,
                    excerpts: Vec::new(),
                });
            }
        }
        interrupt.check()?;

        trail.push(Stage::Checkpointing);
        let checkpoints = CheckpointManager::new(self.vcs, self.rejects, root);
        self.progress.event(&Event::CreatingCheckpoint {
            label: &self.options.checkpoint_tag,
        });
        let checkpoint = checkpoints
            .create(&self.options.checkpoint_tag)
            .map_err(|e| interrupt.attribute(e))?;
        self.progress.event(&Event::CheckpointCreated(&checkpoint));

        trail.push(Stage::Applying);
        self.progress.event(&Event::Applying { patch });
        let applier = Applier::new(self.tool, self.vcs, self.rejects)
            .with_fuzz(self.options.fuzz)
            .with_interrupt(interrupt.clone());
        let outcome = match applier.apply(root, patch).and_then(failure_as_error) {
            Ok(outcome) => outcome,
            Err(e) => {
                let cause = interrupt.attribute(e);
                return Err(self.abandon(&checkpoints, &checkpoint, cause));
            }
        };
        self.progress.event(&Event::Applied {
            patch,
            outcome: &outcome,
        });

        let rejects = match outcome {
            ApplyOutcome::Rejected(paths) => paths,
            applied => {
                trail.push(Stage::Done);
                return Ok(SafeApplyReport {
                    trail,
                    probe: Some(state),
                    checkpoint: Some(checkpoint),
                    disposition: Disposition::Applied(applied),
                    excerpts: Vec::new(),
                });
            }
        };

        let excerpts = reject_excerpts(self.rejects, &rejects);
        trail.push(Stage::RevertPolicy);
        let restored = if self.options.no_revert {
            info!("leaving failed apply in place");
            false
        } else {
            trail.push(Stage::Reverting);
            self.progress.event(&Event::Reverting(&checkpoint));
            checkpoints
                .revert(&checkpoint.label)
                .map_err(|e| interrupt.attribute(e))?;
            self.progress.event(&Event::Reverted(&checkpoint));
            true
        };
        trail.push(Stage::Done);
        Ok(SafeApplyReport {
            trail,
            probe: Some(state),
            checkpoint: Some(checkpoint),
            disposition: Disposition::Rejected { rejects, restored },
            excerpts,
        })
    }

    /// Put the tree back (unless `no_revert`) after the apply step ended in `cause`.
    fn abandon(
        &self,
        checkpoints: &CheckpointManager<'_>,
        checkpoint: &Checkpoint,
        cause: PatchError,
    ) -> PatchError {
        if self.options.no_revert {
            return cause;
        }
        info!(%cause, label = %checkpoint.label, "reverting after aborted apply");
        self.progress.event(&Event::Reverting(checkpoint));
        match checkpoints.revert(&checkpoint.label) {
            Ok(_) => self.progress.event(&Event::Reverted(checkpoint)),
            Err(e) => error!(error = %e, "revert after aborted apply failed"),
        }
        cause
    }
}

/// A tool that ran but neither applied nor left rejects has nothing to show the operator.
fn failure_as_error(outcome: ApplyOutcome) -> PatchResult<ApplyOutcome> {
    match outcome {
        ApplyOutcome::Failed(reason) => Err(PatchError::Execution(anyhow!(reason))),
        other => Ok(other),
    }
}
