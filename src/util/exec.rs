use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use wait_timeout::ChildExt;

use crate::ports::CommandRunner;

/// What happens to a child's stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Pipe and return both streams in the result.
    #[default]
    Capture,
    /// Stream straight to our own stdout/stderr.
    Inherit,
    /// Send both streams to the null device.
    Discard,
}

/// Blocking command execution. A zero timeout means wait forever.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
    echo: bool,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            echo: false,
        }
    }

    /// Echo every command line to stderr before spawning it.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn spawn_and_wait(&self, request: &ExecRequest) -> Result<CommandResult> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }
        if !request.inherit_env {
            cmd.env_clear();
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        match request.output {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        let line = request.display();
        if self.echo {
            eprintln!("*** -> {line}");
        }
        debug!(command = %line, cwd = ?request.cwd, "spawning");

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {:?}", request.program))?;

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let (status, stdout, stderr) = if timeout.is_zero() {
            let out = child
                .wait_with_output()
                .context("failed to wait for process")?;
            (
                out.status,
                String::from_utf8_lossy(&out.stdout).into_owned(),
                String::from_utf8_lossy(&out.stderr).into_owned(),
            )
        } else {
            let mut stdout_pipe = child.stdout.take();
            let mut stderr_pipe = child.stderr.take();
            let status = match child
                .wait_timeout(timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {:?}",
                        request.program,
                        timeout
                    ));
                }
            };
            (
                status,
                read_stream(stdout_pipe.as_mut())?,
                read_stream(stderr_pipe.as_mut())?,
            )
        };

        let result = CommandResult {
            code: status.code(),
            duration: started.elapsed(),
            stdout,
            stderr,
        };
        debug!(command = %line, code = ?result.code, elapsed = ?result.duration, "finished");
        Ok(result)
    }
}

impl CommandRunner for ExecService {
    fn run(&self, request: &ExecRequest) -> Result<CommandResult> {
        let result = self.spawn_and_wait(request)?;
        if request.check && !result.success() {
            let detail = result.stderr.trim();
            return Err(anyhow!(
                "command '{}' failed with exit code {}{}",
                request.display(),
                result
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "(signal)".to_string()),
                if detail.is_empty() {
                    String::new()
                } else {
                    format!(": {detail}")
                }
            ));
        }
        Ok(result)
    }
}

fn read_stream(stream: Option<&mut impl io::Read>) -> Result<String> {
    let mut buf = String::new();
    if let Some(reader) = stream {
        reader
            .read_to_string(&mut buf)
            .context("failed to read process output")?;
    }
    Ok(buf)
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    inherit_env: bool,
    timeout: Option<Duration>,
    output: OutputMode,
    check: bool,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            inherit_env: true,
            timeout: None,
            output: OutputMode::Capture,
            check: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// Turn a nonzero exit into an error.
    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn arg_list(&self) -> &[OsString] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output
    }

    pub fn checks(&self) -> bool {
        self.check
    }

    /// Shell-quoted command line, for echoing and error messages.
    pub fn display(&self) -> String {
        let mut words = vec![self.program.to_string_lossy().into_owned()];
        words.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        crate::util::shell_join(&words)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}
