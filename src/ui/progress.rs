use crate::orchestrator::{Event, Progress};
use crate::types::{ApplyOutcome, Direction, PatchState};
use crate::ui::console::{print_step, print_success, print_warning};

/// Prints orchestrator events the way an operator reads them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress {
    /// Suppress everything except warnings about the tree.
    pub silent: bool,
}

impl ConsoleProgress {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }
}

impl Progress for ConsoleProgress {
    fn event(&self, event: &Event<'_>) {
        match *event {
            Event::Probed { state, .. } => {
                if state == PatchState::AlreadyApplied {
                    print_warning("Patch appears to be already applied");
                }
            }
            Event::Skipped { patch, direction } => {
                if !self.silent {
                    let why = match direction {
                        Direction::Forward => "already applied",
                        Direction::Reverse => "not applied",
                    };
                    println!("\n*** Skipping {} ({why})", patch.display());
                }
            }
            Event::CreatingCheckpoint { label } => {
                if !self.silent {
                    print_step(&format!("Creating checkpoint: {label}"));
                }
            }
            Event::CheckpointCreated(cp) => {
                if !self.silent {
                    print_success(&format!("Checkpoint created at {}", cp.short_revision()));
                }
            }
            Event::Applying { patch } => {
                if !self.silent {
                    print_step(&format!("Applying patch: {}", patch.display()));
                }
            }
            Event::Applied { outcome, .. } => {
                if self.silent {
                    return;
                }
                match outcome {
                    ApplyOutcome::AppliedExact => print_success("Patch applied cleanly"),
                    ApplyOutcome::AppliedFuzzy => print_success("Patch applied with fuzz"),
                    ApplyOutcome::Reverted => print_success("Patch reverted"),
                    ApplyOutcome::AlreadyApplied => {
                        print_success("All hunks were already applied or skipped")
                    }
                    ApplyOutcome::Rejected(_) | ApplyOutcome::Failed(_) => {}
                }
            }
            Event::Reverting(cp) => {
                print_step(&format!("Reverting to checkpoint: {}", cp.short_revision()))
            }
            Event::Reverted(_) => print_success("Successfully reverted to checkpoint"),
        }
    }
}
