//! Command runner double that records requests and replays a canned result.
use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::anyhow;

use crate::ports::CommandRunner;
use crate::util::exec::{CommandResult, ExecRequest, OutputMode};

pub(crate) struct RecordingRunner {
    code: Option<i32>,
    stdout: String,
    spawn_fails: bool,
    seen: RefCell<Vec<(String, Option<PathBuf>, OutputMode)>>,
}

impl RecordingRunner {
    pub(crate) fn succeeding() -> Self {
        Self::with_exit(0, "")
    }

    pub(crate) fn with_exit(code: i32, stdout: &str) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.to_string(),
            spawn_fails: false,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing_spawn() -> Self {
        Self {
            spawn_fails: true,
            ..Self::succeeding()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|(c, _, _)| c.clone()).collect()
    }

    pub(crate) fn cwds(&self) -> Vec<Option<PathBuf>> {
        self.seen.borrow().iter().map(|(_, d, _)| d.clone()).collect()
    }

    pub(crate) fn output_modes(&self) -> Vec<OutputMode> {
        self.seen.borrow().iter().map(|(_, _, m)| *m).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, request: &ExecRequest) -> anyhow::Result<CommandResult> {
        self.seen.borrow_mut().push((
            request.display(),
            request.working_dir().map(PathBuf::from),
            request.output_mode(),
        ));
        if self.spawn_fails {
            return Err(anyhow!("failed to spawn {:?}", request.program()));
        }
        let result = CommandResult {
            code: self.code,
            stdout: self.stdout.clone(),
            ..CommandResult::default()
        };
        if request.checks() && !result.success() {
            return Err(anyhow!("command '{}' failed", request.display()));
        }
        Ok(result)
    }
}
