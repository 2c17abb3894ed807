/*!
Test support helpers shared across integration tests.

- have_git() / have_patch(): tool availability on PATH
- init_repo_with_default_user(dir): initialize a git repo with a default identity
- commit_all(dir, msg): stage and commit everything
- digest(dir): content digest of the working tree (outside `.git`)

These helpers do not print skip messages themselves so each test keeps its own
"skipping: ..." line.
*/

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

fn tool_runs(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return true if `git` is available on PATH.
#[allow(dead_code)]
pub fn have_git() -> bool {
    tool_runs("git")
}

/// Return true if a `patch` that understands `--version` is on PATH.
#[allow(dead_code)]
pub fn have_patch() -> bool {
    tool_runs("patch")
}

#[allow(dead_code)]
pub fn have_tools() -> bool {
    have_git() && have_patch()
}

fn git(dir: &Path, args: &[&str]) -> io::Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("git {args:?} failed: {status}")))
    }
}

#[allow(dead_code)]
pub fn init_repo_with_default_user(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    git(dir, &["init", "-q"])?;
    git(dir, &["config", "user.name", "Safe Patch Test"])?;
    git(dir, &["config", "user.email", "safe-patch@example.com"])?;
    git(dir, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

#[allow(dead_code)]
pub fn commit_all(dir: &Path, msg: &str) -> io::Result<()> {
    git(dir, &["add", "-A"])?;
    git(dir, &["commit", "-q", "--allow-empty", "-m", msg])
}

#[allow(dead_code)]
pub fn digest(dir: &Path) -> String {
    safe_patch::util::fs::tree_digest(dir).expect("digest")
}

/// Seven numbered lines with `line4` replaced by `target`.
#[allow(dead_code)]
pub const BASE: &str = "line1\nline2\nline3\ntarget\nline5\nline6\nline7\n";

/// The same file after the patch below.
#[allow(dead_code)]
pub const PATCHED: &str = "line1\nline2\nline3\npatched\nline5\nline6\nline7\n";

/// Unified diff turning `target` into `patched` in `a.txt`.
#[allow(dead_code)]
pub const TARGET_PATCH: &str = "\
--- a/a.txt
+++ b/a.txt
@@ -1,7 +1,7 @@
 line1
 line2
 line3
-target
+patched
 line5
 line6
 line7
";

/// Unified diff creating `b.txt`.
#[allow(dead_code)]
pub fn new_file_patch(content_line: &str) -> String {
    format!("--- /dev/null\n+++ b/b.txt\n@@ -0,0 +1 @@\n+{content_line}\n")
}

/// Lay out `<root>/camoufox-1.0-test` as a committed repo holding `a.txt` and return it.
#[allow(dead_code)]
pub fn source_tree(root: &Path, a_txt: &str) -> std::path::PathBuf {
    let src = root.join("camoufox-1.0-test");
    init_repo_with_default_user(&src).expect("init repo");
    std::fs::write(src.join("a.txt"), a_txt).expect("write a.txt");
    commit_all(&src, "base").expect("commit");
    src
}

#[allow(dead_code)]
pub fn write_patch(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    std::fs::create_dir_all(dir).expect("patch dir");
    let p = dir.join(name);
    std::fs::write(&p, body).expect("write patch");
    p
}
