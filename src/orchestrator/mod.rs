//! Sequencing of probe, checkpoint, apply and revert.
//!
//! [`SafeApply`] drives one patch through the interactive state machine; [`BatchApply`]
//! runs an ordered set without checkpoints and halts at the first genuine failure.
//! Both report progress through [`Progress`] so the binaries own all console output.

use std::path::Path;

use crate::types::{ApplyOutcome, Checkpoint, Direction, PatchState};

pub mod batch;
pub mod safe;

pub use batch::{BatchApply, BatchEntry, BatchReport};
pub use safe::{
    Disposition, SafeApply, SafeApplyOptions, SafeApplyReport, Stage, CONFIRM_QUESTION,
};

/// Things worth telling the operator while a run is in flight.
#[derive(Debug, Clone, Copy)]
pub enum Event<'e> {
    Probed { patch: &'e Path, state: PatchState },
    /// Batch mode passed over a patch already in the state `direction` asks for.
    Skipped { patch: &'e Path, direction: Direction },
    CreatingCheckpoint { label: &'e str },
    CheckpointCreated(&'e Checkpoint),
    Applying { patch: &'e Path },
    Applied { patch: &'e Path, outcome: &'e ApplyOutcome },
    Reverting(&'e Checkpoint),
    Reverted(&'e Checkpoint),
}

pub trait Progress {
    fn event(&self, event: &Event<'_>);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn event(&self, _event: &Event<'_>) {}
}
