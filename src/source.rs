//! Locating the source tree patches apply to.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{PatchError, PatchResult};

/// Default directory-name prefix of source trees.
pub const DEFAULT_SOURCE_PREFIX: &str = "camoufox-";

/// Resolve the source tree under `root`.
///
/// With both `version` and `release`, the tree must be exactly `<prefix><version>-<release>`.
/// Otherwise the first directory (by name) starting with `prefix` is used.
pub fn resolve_source_dir(
    root: &Path,
    version: Option<&str>,
    release: Option<&str>,
    prefix: &str,
) -> PatchResult<PathBuf> {
    if let (Some(v), Some(r)) = (version, release) {
        let dir = root.join(format!("{prefix}{v}-{r}"));
        if !dir.is_dir() {
            return Err(PatchError::resolution(format!(
                "{} does not exist",
                dir.display()
            )));
        }
        return Ok(dir);
    }

    let entries = std::fs::read_dir(root).map_err(|e| {
        PatchError::resolution(format!("cannot read {}: {e}", root.display()))
    })?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    candidates.sort();
    debug!(count = candidates.len(), prefix, "source tree candidates");
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| {
            PatchError::resolution(format!("no {prefix}* folder found in {}", root.display()))
        })
}
