//! Error taxonomy and exit-code mapping.
//!
//! - `ApplyConflict` is raised after the checkpoint revert (or the `--no-revert` notice) so
//!   the binary ends on the conflict summary and its hint.
//! - Everything else propagates to the binary, which prints it and exits nonzero.
//! - "Already applied" is not an error; it is a probe/apply outcome.
use std::path::PathBuf;

use thiserror::Error;

/// Exit code for a user interrupt (128 + SIGINT).
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Error)]
pub enum PatchError {
    /// Patch file or source tree could not be located.
    #[error("{message}")]
    Resolution { message: String },

    /// The source tree exists but is not a git repository.
    #[error("source directory is not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// Hunks could not be placed; `rejects` lists the conflict artifacts found.
    #[error("patch {} failed with {} rejected file(s)", patch.display(), rejects.len())]
    ApplyConflict {
        patch: PathBuf,
        rejects: Vec<PathBuf>,
    },

    /// The checkpoint label no longer resolves to a revision.
    #[error("checkpoint '{label}' does not resolve to a revision")]
    CheckpointMissing { label: String },

    /// Another run holds the tree lock.
    #[error("another patch run is in progress (lock held at {})", path.display())]
    Locked { path: PathBuf },

    /// The underlying tool invocation failed for reasons unrelated to patch content.
    #[error("execution error: {0:#}")]
    Execution(#[from] anyhow::Error),

    #[error("interrupted by user")]
    Interrupted,
}

impl PatchError {
    pub fn resolution(message: impl Into<String>) -> Self {
        PatchError::Resolution {
            message: message.into(),
        }
    }

    /// Recommended process exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            PatchError::Interrupted => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

pub type PatchResult<T> = Result<T, PatchError>;
