use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{PatchError, PatchResult};

/// Tree-scoped lock guard that removes the lock file on drop.
#[derive(Debug)]
pub struct TreeLock {
    file: File,
    path: PathBuf,
}

impl TreeLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TreeLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

/// Where the lock for `tree` lives: inside `.git` when the tree is a repository,
/// otherwise a per-tree hashed file in the temp directory.
pub fn lock_path_for(tree: &Path) -> PathBuf {
    let git_dir = tree.join(".git");
    if git_dir.is_dir() {
        return git_dir.join("safe-patch.lock");
    }
    std::env::temp_dir().join(format!("safe-patch.{}.lock", tree_key_hash(tree)))
}

/// Short stable hash of the canonical tree path.
pub fn tree_key_hash(tree: &Path) -> String {
    let abs = fs::canonicalize(tree).unwrap_or_else(|_| tree.to_path_buf());
    let digest = Sha256::digest(abs.to_string_lossy().as_bytes());
    hex::encode(&digest[..8])
}

/// Take the exclusive lock for `tree` without blocking.
pub fn acquire_tree_lock(tree: &Path) -> PatchResult<TreeLock> {
    acquire_lock_at(&lock_path_for(tree))
}

/// Take an exclusive lock at a specific path; `Locked` when another process holds it.
pub fn acquire_lock_at(p: &Path) -> PatchResult<TreeLock> {
    if let Some(parent) = p.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(p)
        .map_err(|e| anyhow::Error::new(e).context(format!("open lock file {}", p.display())))?;
    match file.try_lock_exclusive() {
        Ok(()) => {
            tracing::debug!(path = %p.display(), "tree lock acquired");
            Ok(TreeLock {
                file,
                path: p.to_path_buf(),
            })
        }
        Err(e) if is_contended(&e) => Err(PatchError::Locked {
            path: p.to_path_buf(),
        }),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("lock {}", p.display()))
            .into()),
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
