//! Default process/filesystem-backed port implementations.

mod git;
mod patch;
mod rejects;

pub use git::GitVcs;
pub use patch::{ShellPatchTool, STRIP_LEVEL};
pub use rejects::{FsRejectScanner, REJECT_SUFFIX};

#[cfg(test)]
pub(crate) mod testing;
