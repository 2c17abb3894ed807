use std::path::Path;

use tracing::debug;

use crate::errors::PatchResult;
use crate::ports::PatchTool;
use crate::types::{Direction, PatchState};

/// Decide whether `patch` is unapplied, already applied or indeterminate, using dry runs only.
pub fn probe(tool: &dyn PatchTool, root: &Path, patch: &Path) -> PatchResult<PatchState> {
    let state = if tool.dry_run(root, patch, Direction::Forward, None)? {
        PatchState::Unapplied
    } else if tool.dry_run(root, patch, Direction::Reverse, None)? {
        PatchState::AlreadyApplied
    } else {
        PatchState::Indeterminate
    };
    debug!(patch = %patch.display(), ?state, "probed");
    Ok(state)
}
