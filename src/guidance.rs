//! Follow-up instructions printed after a run.

use std::path::Path;

use crate::errors::PatchError;

/// Commands that undo a successful apply later on.
pub fn revert_later_lines(src_dir: &Path, tag: &str) -> Vec<String> {
    vec![
        format!("  cd {}", src_dir.display()),
        format!("  git reset --hard {tag}"),
    ]
}

/// Commands that restore the checkpoint after a failed apply left in place.
pub fn manual_revert_lines(src_dir: &Path, tag: &str) -> Vec<String> {
    let mut lines = revert_later_lines(src_dir, tag);
    lines.push("  git clean -fd".to_string());
    lines
}

pub fn print_revert_later(src_dir: &Path, tag: &str) {
    println!("\nTo revert this patch later, run:");
    for l in revert_later_lines(src_dir, tag) {
        println!("{l}");
    }
}

pub fn print_manual_revert(src_dir: &Path, tag: &str) {
    println!("\nTo revert manually, run:");
    for l in manual_revert_lines(src_dir, tag) {
        println!("{l}");
    }
}

/// A next step for the operator, when the error has an obvious one.
pub fn hint_for(err: &PatchError) -> Option<&'static str> {
    match err {
        PatchError::NotARepository { .. } => {
            Some("Run 'make setup' to initialize the git repository")
        }
        PatchError::ApplyConflict { .. } => {
            Some("Inspect the .rej files and refresh the patch against the current tree")
        }
        PatchError::Locked { .. } => Some("Wait for the other run to finish, then try again"),
        PatchError::CheckpointMissing { .. } => {
            Some("The checkpoint tag is gone; inspect the tree with 'git status' before retrying")
        }
        _ => None,
    }
}
