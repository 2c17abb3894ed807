//! Named restore points in the tree's own history.
//!
//! A checkpoint is a commit of the whole working tree (untracked files included) with a
//! movable tag pointing at it. Reverting resets to the tag and then removes anything
//! the apply created that git does not track.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::{PatchError, PatchResult};
use crate::ports::{RejectScanner, Vcs};
use crate::types::Checkpoint;

pub const DEFAULT_CHECKPOINT_TAG: &str = "safe-patch-checkpoint";
pub const CHECKPOINT_MESSAGE: &str = "[safe-patch] Checkpoint before applying patch";

pub struct CheckpointManager<'a> {
    vcs: &'a dyn Vcs,
    rejects: &'a dyn RejectScanner,
    root: PathBuf,
}

impl<'a> CheckpointManager<'a> {
    pub fn new(vcs: &'a dyn Vcs, rejects: &'a dyn RejectScanner, root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            rejects,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot the current tree under `label`, replacing an earlier checkpoint of that name.
    pub fn create(&self, label: &str) -> PatchResult<Checkpoint> {
        self.ensure_repository()?;
        validate_label(label)?;
        self.vcs.stage_all(&self.root)?;
        self.vcs.commit_all(&self.root, CHECKPOINT_MESSAGE)?;
        self.vcs.tag_force(&self.root, label)?;
        let revision = self.lookup(label)?;
        let cp = Checkpoint {
            label: label.to_string(),
            revision,
        };
        info!(label, revision = cp.short_revision(), "checkpoint created");
        Ok(cp)
    }

    /// Restore the tree to `label`: tracked content, untracked files and reject files.
    pub fn revert(&self, label: &str) -> PatchResult<Checkpoint> {
        self.ensure_repository()?;
        let revision = self.lookup(label)?;
        self.vcs.reset_hard(&self.root, &revision)?;
        self.vcs.clean_untracked(&self.root)?;
        // Reject files matched by an ignore rule survive `git clean`.
        let leftover = self.rejects.remove_rejects(&self.root)?;
        if leftover > 0 {
            warn!(count = leftover, "removed ignored reject files after reset");
        }
        let cp = Checkpoint {
            label: label.to_string(),
            revision,
        };
        info!(label, revision = cp.short_revision(), "reverted to checkpoint");
        Ok(cp)
    }

    /// Resolve `label` without touching the tree.
    pub fn lookup(&self, label: &str) -> PatchResult<String> {
        self.vcs
            .resolve(&self.root, label)?
            .ok_or_else(|| PatchError::CheckpointMissing {
                label: label.to_string(),
            })
    }

    fn ensure_repository(&self) -> PatchResult<()> {
        if self.vcs.is_repository(&self.root) {
            Ok(())
        } else {
            Err(PatchError::NotARepository {
                path: self.root.clone(),
            })
        }
    }
}

fn validate_label(label: &str) -> PatchResult<()> {
    let bad = label.trim().is_empty()
        || label.starts_with('-')
        || label.chars().any(|c| c.is_whitespace() || c.is_control());
    if bad {
        return Err(PatchError::resolution(format!(
            "invalid checkpoint tag name: {label:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fakes::{FakeRejects, FakeVcs};

    #[test]
    fn create_stages_commits_then_tags() {
        let vcs = FakeVcs::default();
        let rejects = FakeRejects::default();
        let mgr = CheckpointManager::new(&vcs, &rejects, "/t");
        let cp = mgr.create(DEFAULT_CHECKPOINT_TAG).unwrap();
        assert_eq!(cp.label, DEFAULT_CHECKPOINT_TAG);
        assert_eq!(cp.revision, "c1");
        assert_eq!(vcs.log(), vec!["add", "commit", "tag:safe-patch-checkpoint"]);
    }

    #[test]
    fn create_moves_existing_label() {
        let vcs = FakeVcs::default();
        let rejects = FakeRejects::default();
        let mgr = CheckpointManager::new(&vcs, &rejects, "/t");
        mgr.create("cp").unwrap();
        let second = mgr.create("cp").unwrap();
        assert_eq!(second.revision, "c2");
        assert_eq!(mgr.lookup("cp").unwrap(), "c2");
    }

    #[test]
    fn revert_resets_cleans_and_drops_rejects() {
        let vcs = FakeVcs::default();
        let rejects = FakeRejects::with(&["/t/ignored.rej"]);
        let mgr = CheckpointManager::new(&vcs, &rejects, "/t");
        mgr.create("cp").unwrap();
        mgr.revert("cp").unwrap();
        assert_eq!(&vcs.log()[3..], ["reset:c1", "clean"]);
        assert!(rejects.found.borrow().is_empty());
    }

    #[test]
    fn revert_of_missing_label_fails_before_touching_tree() {
        let vcs = FakeVcs::default();
        let rejects = FakeRejects::default();
        let mgr = CheckpointManager::new(&vcs, &rejects, "/t");
        mgr.create("cp").unwrap();
        vcs.drop_tag("cp");
        let err = mgr.revert("cp").unwrap_err();
        assert!(matches!(err, PatchError::CheckpointMissing { ref label } if label == "cp"));
        assert!(!vcs.log().iter().any(|c| c.starts_with("reset")));
    }

    #[test]
    fn non_repository_is_rejected() {
        let vcs = FakeVcs {
            repository: false,
            ..FakeVcs::default()
        };
        let rejects = FakeRejects::default();
        let mgr = CheckpointManager::new(&vcs, &rejects, "/t");
        assert!(matches!(
            mgr.create("cp"),
            Err(PatchError::NotARepository { .. })
        ));
    }

    #[test]
    fn commit_failure_is_execution_error() {
        let vcs = FakeVcs {
            fail_commit: true,
            ..FakeVcs::default()
        };
        let rejects = FakeRejects::default();
        let mgr = CheckpointManager::new(&vcs, &rejects, "/t");
        assert!(matches!(mgr.create("cp"), Err(PatchError::Execution(_))));
    }

    #[test]
    fn odd_labels_are_refused() {
        for label in ["", "  ", "-f", "two words"] {
            assert!(validate_label(label).is_err(), "{label:?}");
        }
        assert!(validate_label("safe-patch-checkpoint").is_ok());
    }
}
