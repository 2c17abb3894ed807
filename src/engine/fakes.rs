//! In-memory port implementations for engine and orchestrator tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::interrupt::InterruptFlag;
use crate::ports::{PatchTool, Prompter, RejectScanner, Vcs};
use crate::types::Direction;

/// Scripted patch tool. Every flag defaults to "the tool reports failure".
#[derive(Debug, Default)]
pub(crate) struct FakeTool {
    pub merge_ok: bool,
    /// Forward dry run with `--fuzz=0`.
    pub forward_exact: bool,
    /// Forward dry run with the default or a nonzero fuzz.
    pub forward_fuzzy: bool,
    pub reverse: bool,
    pub fuzzy_ok: bool,
    /// Every call errors as if the binary were missing.
    pub broken: bool,
    /// Merge apply fires this flag and fails, like a child killed by Ctrl-C.
    pub interrupt_on_merge: Option<InterruptFlag>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeTool {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.broken {
            return Err(anyhow!("failed to spawn \"patch\""));
        }
        Ok(())
    }
}

impl PatchTool for FakeTool {
    fn dry_run(
        &self,
        _root: &Path,
        _patch: &Path,
        direction: Direction,
        fuzz: Option<u32>,
    ) -> Result<bool> {
        let dir = match direction {
            Direction::Forward => "F",
            Direction::Reverse => "R",
        };
        let f = fuzz.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string());
        self.record(format!("dry:{dir}:{f}"))?;
        Ok(match (direction, fuzz) {
            (Direction::Forward, Some(0)) => self.forward_exact,
            (Direction::Forward, _) => self.forward_fuzzy,
            (Direction::Reverse, _) => self.reverse,
        })
    }

    fn merge_apply(&self, _root: &Path, _patch: &Path) -> Result<bool> {
        self.record("merge".to_string())?;
        if let Some(flag) = &self.interrupt_on_merge {
            flag.trigger();
            return Err(anyhow!("command 'git apply' failed with exit code (signal)"));
        }
        Ok(self.merge_ok)
    }

    fn fuzzy_apply(
        &self,
        _root: &Path,
        _patch: &Path,
        direction: Direction,
        fuzz: u32,
    ) -> Result<bool> {
        match direction {
            Direction::Forward => self.record(format!("fuzzy:{fuzz}"))?,
            Direction::Reverse => self.record(format!("fuzzy:R:{fuzz}"))?,
        }
        Ok(self.fuzzy_ok)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeRejects {
    pub found: RefCell<Vec<PathBuf>>,
}

impl FakeRejects {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            found: RefCell::new(paths.iter().map(PathBuf::from).collect()),
        }
    }
}

impl RejectScanner for FakeRejects {
    fn find_rejects(&self, _root: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.found.borrow().clone())
    }

    fn excerpt(&self, path: &Path, max_chars: usize) -> Option<String> {
        let body = format!("@@ rejected hunk in {} @@", path.display());
        Some(body.chars().take(max_chars).collect())
    }

    fn remove_rejects(&self, _root: &Path) -> Result<usize> {
        let mut found = self.found.borrow_mut();
        let n = found.len();
        found.clear();
        Ok(n)
    }
}

/// Git stand-in that tracks commits and tags and logs mutating calls.
#[derive(Debug)]
pub(crate) struct FakeVcs {
    pub repository: bool,
    pub unmerged: Vec<PathBuf>,
    pub fail_commit: bool,
    /// Commit fires this flag and fails, like a signalled `git commit`.
    pub interrupt_on_commit: Option<InterruptFlag>,
    pub head: RefCell<u32>,
    pub tags: RefCell<BTreeMap<String, String>>,
    pub log: RefCell<Vec<String>>,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self {
            repository: true,
            unmerged: Vec::new(),
            fail_commit: false,
            interrupt_on_commit: None,
            head: RefCell::new(0),
            tags: RefCell::new(BTreeMap::new()),
            log: RefCell::new(Vec::new()),
        }
    }
}

impl FakeVcs {
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn drop_tag(&self, label: &str) {
        self.tags.borrow_mut().remove(label);
    }
}

impl Vcs for FakeVcs {
    fn is_repository(&self, _root: &Path) -> bool {
        self.repository
    }

    fn stage_all(&self, _root: &Path) -> Result<()> {
        self.log.borrow_mut().push("add".to_string());
        Ok(())
    }

    fn commit_all(&self, _root: &Path, _message: &str) -> Result<()> {
        if let Some(flag) = &self.interrupt_on_commit {
            flag.trigger();
            return Err(anyhow!("command 'git commit' failed with exit code (signal)"));
        }
        if self.fail_commit {
            return Err(anyhow!("command 'git commit' failed with exit code 1"));
        }
        *self.head.borrow_mut() += 1;
        self.log.borrow_mut().push("commit".to_string());
        Ok(())
    }

    fn tag_force(&self, _root: &Path, label: &str) -> Result<()> {
        let head = format!("c{}", self.head.borrow());
        self.tags.borrow_mut().insert(label.to_string(), head);
        self.log.borrow_mut().push(format!("tag:{label}"));
        Ok(())
    }

    fn resolve(&self, _root: &Path, rev: &str) -> Result<Option<String>> {
        Ok(self.tags.borrow().get(rev).cloned())
    }

    fn reset_hard(&self, _root: &Path, rev: &str) -> Result<()> {
        self.log.borrow_mut().push(format!("reset:{rev}"));
        Ok(())
    }

    fn clean_untracked(&self, _root: &Path) -> Result<()> {
        self.log.borrow_mut().push("clean".to_string());
        Ok(())
    }

    fn unmerged_paths(&self, _root: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.unmerged.clone())
    }
}

/// Answers every confirmation with a fixed value and remembers the questions.
#[derive(Debug, Default)]
pub(crate) struct FakePrompter {
    pub answer: bool,
    pub asked: RefCell<Vec<String>>,
}

impl FakePrompter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: RefCell::new(Vec::new()),
        }
    }
}

impl Prompter for FakePrompter {
    fn confirm(&self, question: &str) -> bool {
        self.asked.borrow_mut().push(question.to_string());
        self.answer
    }
}
