use std::fmt;
use std::path::PathBuf;

/// Result of probing a patch against the tree without touching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    /// Forward dry run succeeds.
    Unapplied,
    /// Forward fails but reverse dry run succeeds.
    AlreadyApplied,
    /// Neither direction applies cleanly; the tree has diverged.
    Indeterminate,
}

/// Which way a patch is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Final outcome of one apply attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The tree already holds the requested result. When unapplying, the patch was not
    /// in the tree to begin with.
    AlreadyApplied,
    AppliedExact,
    AppliedFuzzy,
    /// Unapplied with `-R`, exact or fuzzy.
    Reverted,
    /// Conflict artifacts found after the attempt (never empty).
    Rejected(Vec<PathBuf>),
    /// The tool invocation itself failed; only produced by batch runs.
    Failed(String),
}

impl ApplyOutcome {
    /// True for every outcome that leaves the tree in the requested state.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ApplyOutcome::AlreadyApplied
                | ApplyOutcome::AppliedExact
                | ApplyOutcome::AppliedFuzzy
                | ApplyOutcome::Reverted
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplyOutcome::AlreadyApplied => "already-applied",
            ApplyOutcome::AppliedExact => "applied",
            ApplyOutcome::AppliedFuzzy => "applied-fuzzy",
            ApplyOutcome::Reverted => "reverted",
            ApplyOutcome::Rejected(_) => "rejected",
            ApplyOutcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOutcome::Rejected(paths) => {
                write!(f, "rejected ({} conflict file(s))", paths.len())
            }
            ApplyOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// A labelled, committed snapshot of the whole working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub label: String,
    pub revision: String,
}

impl Checkpoint {
    pub fn short_revision(&self) -> &str {
        let end = self
            .revision
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.revision.len());
        &self.revision[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_outcomes() {
        assert!(ApplyOutcome::AlreadyApplied.is_success());
        assert!(ApplyOutcome::AppliedExact.is_success());
        assert!(ApplyOutcome::AppliedFuzzy.is_success());
        assert!(ApplyOutcome::Reverted.is_success());
        assert!(!ApplyOutcome::Rejected(vec![PathBuf::from("a.rej")]).is_success());
        assert!(!ApplyOutcome::Failed("x".into()).is_success());
    }

    #[test]
    fn flipped_direction() {
        assert_eq!(Direction::Forward.flipped(), Direction::Reverse);
        assert_eq!(Direction::Reverse.flipped(), Direction::Forward);
    }

    #[test]
    fn short_revision_truncates_to_eight() {
        let cp = Checkpoint {
            label: "safe-patch-checkpoint".into(),
            revision: "0123456789abcdef".into(),
        };
        assert_eq!(cp.short_revision(), "01234567");
        let short = Checkpoint {
            label: "x".into(),
            revision: "abc".into(),
        };
        assert_eq!(short.short_revision(), "abc");
    }

    #[test]
    fn display_rejected_counts_paths() {
        let o = ApplyOutcome::Rejected(vec![PathBuf::from("a.rej"), PathBuf::from("b.rej")]);
        assert_eq!(o.to_string(), "rejected (2 conflict file(s))");
        assert_eq!(ApplyOutcome::AppliedFuzzy.to_string(), "applied-fuzzy");
    }
}
