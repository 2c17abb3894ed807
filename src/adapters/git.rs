use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::ports::{CommandRunner, Vcs};
use crate::util::exec::{CommandResult, ExecRequest};

/// [`Vcs`] backed by the `git` binary, always run with the tree root as cwd.
#[derive(Debug, Clone)]
pub struct GitVcs<R> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> GitVcs<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: "git".to_string(),
        }
    }

    fn request(&self, root: &Path, args: &[&str]) -> ExecRequest {
        ExecRequest::new(&self.program)
            .args(args.iter().copied())
            .cwd(root)
    }

    fn git(&self, root: &Path, args: &[&str]) -> Result<CommandResult> {
        self.runner.run(&self.request(root, args))
    }

    fn git_checked(&self, root: &Path, args: &[&str]) -> Result<()> {
        self.runner
            .run(&self.request(root, args).check(true))
            .map(|_| ())
    }
}

impl<R: CommandRunner> Vcs for GitVcs<R> {
    fn is_repository(&self, root: &Path) -> bool {
        root.join(".git").exists()
    }

    fn stage_all(&self, root: &Path) -> Result<()> {
        self.git_checked(root, &["add", "-A"])
    }

    fn commit_all(&self, root: &Path, message: &str) -> Result<()> {
        // No hooks and no signing: a checkpoint must not depend on user tooling.
        self.git_checked(
            root,
            &[
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "--no-verify",
                "-a",
                "--allow-empty",
                "-m",
                message,
            ],
        )
    }

    fn tag_force(&self, root: &Path, label: &str) -> Result<()> {
        self.git_checked(root, &["tag", "-f", label])
    }

    fn resolve(&self, root: &Path, rev: &str) -> Result<Option<String>> {
        let commitish = format!("{rev}^{{commit}}");
        let out = self.git(root, &["rev-parse", "--verify", "--quiet", &commitish])?;
        if !out.success() {
            return Ok(None);
        }
        let sha = out.stdout.trim().to_string();
        Ok(if sha.is_empty() { None } else { Some(sha) })
    }

    fn reset_hard(&self, root: &Path, rev: &str) -> Result<()> {
        self.git_checked(root, &["reset", "-q", "--hard", rev])
    }

    fn clean_untracked(&self, root: &Path) -> Result<()> {
        self.git_checked(root, &["clean", "-fdq"])
    }

    fn unmerged_paths(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let out = self.git(root, &["diff", "--name-only", "--diff-filter=U", "-z"])?;
        if !out.success() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = out
            .stdout
            .split('\0')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| root.join(s))
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}
