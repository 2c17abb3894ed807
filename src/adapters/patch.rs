use std::path::Path;

use anyhow::Result;

use crate::ports::{CommandRunner, PatchTool};
use crate::types::Direction;
use crate::util::exec::{ExecRequest, OutputMode};

/// Strip level applied to every patch (`a/` and `b/` prefixes).
pub const STRIP_LEVEL: u32 = 1;

/// [`PatchTool`] backed by GNU `patch` (dry runs, fuzzy apply in either direction) and
/// `git apply` (merge apply).
#[derive(Debug, Clone)]
pub struct ShellPatchTool<R> {
    runner: R,
    patch_program: String,
    git_program: String,
    apply_output: OutputMode,
}

impl<R: CommandRunner> ShellPatchTool<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            patch_program: "patch".to_string(),
            git_program: "git".to_string(),
            apply_output: OutputMode::Capture,
        }
    }

    /// Where the output of mutating invocations goes; dry runs are always captured.
    pub fn with_apply_output(mut self, mode: OutputMode) -> Self {
        self.apply_output = mode;
        self
    }

    fn succeeded(&self, request: ExecRequest) -> Result<bool> {
        Ok(self.runner.run(&request)?.success())
    }
}

impl<R: CommandRunner> PatchTool for ShellPatchTool<R> {
    fn dry_run(
        &self,
        root: &Path,
        patch: &Path,
        direction: Direction,
        fuzz: Option<u32>,
    ) -> Result<bool> {
        let mut req = ExecRequest::new(&self.patch_program)
            .arg(format!("-p{STRIP_LEVEL}"))
            .cwd(root);
        if direction == Direction::Reverse {
            req = req.arg("-R");
        }
        if let Some(f) = fuzz {
            req = req.arg(format!("--fuzz={f}"));
        }
        let req = req
            .args(["--dry-run", "--force", "--silent", "-i"])
            .arg(patch)
            .output(OutputMode::Capture);
        self.succeeded(req)
    }

    fn merge_apply(&self, root: &Path, patch: &Path) -> Result<bool> {
        let req = ExecRequest::new(&self.git_program)
            .args(["apply", "--3way", "--whitespace=fix"])
            .arg(patch)
            .cwd(root)
            .output(self.apply_output);
        self.succeeded(req)
    }

    fn fuzzy_apply(
        &self,
        root: &Path,
        patch: &Path,
        direction: Direction,
        fuzz: u32,
    ) -> Result<bool> {
        let mut req = ExecRequest::new(&self.patch_program).arg(format!("-p{STRIP_LEVEL}"));
        if direction == Direction::Reverse {
            req = req.arg("-R");
        }
        // --forward keeps patch from prompting on hunks that look reversed. Backups of
        // fuzzed or failed files would survive a revert when the tree ignores `*.orig`.
        let req = req
            .arg(format!("--fuzz={fuzz}"))
            .args(["--forward", "--no-backup-if-mismatch", "-i"])
            .arg(patch)
            .cwd(root)
            .output(self.apply_output);
        self.succeeded(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::RecordingRunner;

    #[test]
    fn forward_dry_run_keeps_tool_default_fuzz() {
        let runner = RecordingRunner::succeeding();
        let tool = ShellPatchTool::new(&runner);
        let ok = tool
            .dry_run(Path::new("/t"), Path::new("/p/a.patch"), Direction::Forward, None)
            .unwrap();
        assert!(ok);
        assert_eq!(
            runner.calls(),
            vec!["patch -p1 --dry-run --force --silent -i /p/a.patch"]
        );
    }

    #[test]
    fn reverse_dry_run_with_fuzz() {
        let runner = RecordingRunner::with_exit(1, "");
        let tool = ShellPatchTool::new(&runner);
        let ok = tool
            .dry_run(Path::new("/t"), Path::new("/p/a.patch"), Direction::Reverse, Some(2))
            .unwrap();
        assert!(!ok);
        assert_eq!(
            runner.calls(),
            vec!["patch -p1 -R --fuzz=2 --dry-run --force --silent -i /p/a.patch"]
        );
    }

    #[test]
    fn merge_apply_uses_three_way_and_whitespace_fix() {
        let runner = RecordingRunner::succeeding();
        let tool = ShellPatchTool::new(&runner).with_apply_output(OutputMode::Discard);
        assert!(tool.merge_apply(Path::new("/t"), Path::new("x.patch")).unwrap());
        assert_eq!(
            runner.calls(),
            vec!["git apply --3way --whitespace=fix x.patch"]
        );
        assert_eq!(runner.output_modes(), vec![OutputMode::Discard]);
    }

    #[test]
    fn fuzzy_apply_refuses_reversed_hunks_and_skips_backups() {
        let runner = RecordingRunner::succeeding();
        let tool = ShellPatchTool::new(&runner);
        tool.fuzzy_apply(Path::new("/t"), Path::new("x.patch"), Direction::Forward, 3)
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec!["patch -p1 --fuzz=3 --forward --no-backup-if-mismatch -i x.patch"]
        );
        assert_eq!(runner.cwds()[0].as_deref(), Some(Path::new("/t")));
    }

    #[test]
    fn reverse_fuzzy_apply_adds_r() {
        let runner = RecordingRunner::succeeding();
        let tool = ShellPatchTool::new(&runner);
        tool.fuzzy_apply(Path::new("/t"), Path::new("x.patch"), Direction::Reverse, 2)
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec!["patch -p1 -R --fuzz=2 --forward --no-backup-if-mismatch -i x.patch"]
        );
    }

    #[test]
    fn spawn_failures_propagate() {
        let runner = RecordingRunner::failing_spawn();
        let tool = ShellPatchTool::new(&runner);
        assert!(tool
            .fuzzy_apply(Path::new("/t"), Path::new("x.patch"), Direction::Forward, 2)
            .is_err());
    }
}
