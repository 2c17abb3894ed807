use std::time::{Duration, Instant};

use crate::interrupt::InterruptFlag;

/// Runs at least this long get their elapsed time reported on success.
pub const REPORT_ELAPSED_AFTER: Duration = Duration::from_secs(60);

/// Per-invocation state: start time and the cancellation flag.
#[derive(Debug, Clone)]
pub struct RunContext {
    started: Instant,
    interrupt: InterruptFlag,
}

impl RunContext {
    pub fn new(interrupt: InterruptFlag) -> Self {
        Self {
            started: Instant::now(),
            interrupt,
        }
    }

    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn should_report_elapsed(&self) -> bool {
        self.elapsed() > REPORT_ELAPSED_AFTER
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(InterruptFlag::new())
    }
}

/// `HH:MM:SS`; hours keep counting past 24.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
