#![allow(clippy::module_name_repetitions)]
//! safe-patch: apply unified-diff patches to a source tree without ever leaving it
//! half-modified.
//!
//! - [`engine`]: probe (dry runs both ways), tiered apply (three-way merge, then fuzz),
//!   reject classification and git checkpoints.
//! - [`orchestrator`]: the single-patch state machine and the ordered batch runner.
//! - [`adapters`]: `git`, `patch` and filesystem implementations of the [`ports`] traits.
//! - Ambient pieces: [`color`], [`ui`], [`telemetry`], [`settings`], [`lock`], [`interrupt`].

pub mod adapters;
pub mod color;
pub mod engine;
pub mod errors;
pub mod guidance;
pub mod interrupt;
pub mod lock;
pub mod orchestrator;
pub mod patches;
pub mod ports;
pub mod preflight;
pub mod run_context;
pub mod settings;
pub mod source;
pub mod telemetry;
pub mod types;
pub mod ui;
pub mod util;

pub use adapters::{FsRejectScanner, GitVcs, ShellPatchTool};
pub use color::{color_enabled_stderr, color_enabled_stdout, paint, set_color_mode, ColorMode};
pub use engine::{probe, Applier, CheckpointManager, DEFAULT_CHECKPOINT_TAG, DEFAULT_FUZZ};
pub use errors::{PatchError, PatchResult, EXIT_INTERRUPTED};
pub use interrupt::InterruptFlag;
pub use orchestrator::{BatchApply, BatchReport, Disposition, SafeApply, SafeApplyOptions, Stage};
pub use patches::{is_bootstrap_patch, list_patches, PatchFile, PATCH_SUFFIX};
pub use run_context::{format_elapsed, RunContext};
pub use settings::Settings;
pub use source::{resolve_source_dir, DEFAULT_SOURCE_PREFIX};
pub use types::{ApplyOutcome, Checkpoint, Direction, PatchState};
pub use util::cwd::TempCwd;
pub use util::exec::{CommandResult, ExecRequest, ExecService, OutputMode};
