use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::ports::RejectScanner;
use crate::util::fs::find_files_with_suffix;

/// Suffix GNU patch uses for files holding hunks it could not place.
pub const REJECT_SUFFIX: &str = ".rej";

/// Walks the tree (outside `.git`) for `*.rej` files.
#[derive(Debug, Clone, Default)]
pub struct FsRejectScanner;

impl RejectScanner for FsRejectScanner {
    fn find_rejects(&self, root: &Path) -> Result<Vec<PathBuf>> {
        find_files_with_suffix(root, REJECT_SUFFIX)
    }

    fn excerpt(&self, path: &Path, max_chars: usize) -> Option<String> {
        let text = std::fs::read(path).ok()?;
        let text = String::from_utf8_lossy(&text);
        Some(text.chars().take(max_chars).collect())
    }

    fn remove_rejects(&self, root: &Path) -> Result<usize> {
        let found = self.find_rejects(root)?;
        for p in &found {
            std::fs::remove_file(p).with_context(|| format!("remove {}", p.display()))?;
            debug!(path = %p.display(), "removed reject file");
        }
        Ok(found.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("f.rej");
        std::fs::write(&p, "äöü-rest").unwrap();
        assert_eq!(FsRejectScanner.excerpt(&p, 3).as_deref(), Some("äöü"));
        assert_eq!(FsRejectScanner.excerpt(&td.path().join("missing"), 3), None);
    }

    #[test]
    fn remove_rejects_deletes_all_and_counts() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("a.c.rej"), "x").unwrap();
        std::fs::write(root.join("sub/b.h.rej"), "x").unwrap();
        std::fs::write(root.join("a.c"), "keep").unwrap();

        assert_eq!(FsRejectScanner.remove_rejects(root).unwrap(), 2);
        assert!(FsRejectScanner.find_rejects(root).unwrap().is_empty());
        assert!(root.join("a.c").exists());
    }
}
