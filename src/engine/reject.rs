use std::path::{Path, PathBuf};

use crate::errors::PatchResult;
use crate::ports::RejectScanner;

/// How many reject files are quoted when reporting a conflict.
pub const EXCERPT_FILES: usize = 3;
/// Characters quoted from each reject file.
pub const EXCERPT_CHARS: usize = 500;

/// What a failed apply left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    /// Conflict artifacts exist; the patch genuinely conflicts.
    Rejected(Vec<PathBuf>),
    /// The tool failed without leaving artifacts: every hunk was already present.
    NoOpAlreadyApplied,
}

/// Classify a failed apply by looking for reject files under `root`.
pub fn classify_failure(scanner: &dyn RejectScanner, root: &Path) -> PatchResult<FailureClass> {
    let rejects = scanner.find_rejects(root)?;
    Ok(if rejects.is_empty() {
        FailureClass::NoOpAlreadyApplied
    } else {
        FailureClass::Rejected(rejects)
    })
}

/// Leading excerpts of the first few reject files, paired with their paths.
pub fn reject_excerpts(scanner: &dyn RejectScanner, rejects: &[PathBuf]) -> Vec<(PathBuf, String)> {
    rejects
        .iter()
        .take(EXCERPT_FILES)
        .filter_map(|p| scanner.excerpt(p, EXCERPT_CHARS).map(|e| (p.clone(), e)))
        .collect()
}
