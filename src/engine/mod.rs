//! Patch-application engine: probe, tiered apply, reject classification and checkpoints.
//!
//! Every function here talks to the tree only through the [`ports`](crate::ports) traits.

pub mod apply;
pub mod checkpoint;
pub mod probe;
pub mod reject;

pub use apply::{rejected_paths, Applier, DEFAULT_FUZZ};
pub use checkpoint::{CheckpointManager, CHECKPOINT_MESSAGE, DEFAULT_CHECKPOINT_TAG};
pub use probe::probe;
pub use reject::{classify_failure, reject_excerpts, FailureClass};

#[cfg(test)]
pub(crate) mod fakes;
