//! SIGINT/SIGTERM handling.
//!
//! The handlers only set a flag. Children share our process group, so Ctrl-C reaches
//! `git`/`patch` directly; the engine notices the flag between steps and unwinds
//! through the checkpoint revert path instead of dying mid-mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(unix)]
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::errors::{PatchError, PatchResult};

static SIGNALLED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_interrupt(_sig: i32) {
    SIGNALLED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the process-wide flag.
#[cfg(unix)]
pub fn install_handlers() -> anyhow::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic.
    unsafe {
        signal::sigaction(Signal::SIGINT, &action)?;
        signal::sigaction(Signal::SIGTERM, &action)?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn install_handlers() -> anyhow::Result<()> {
    Ok(())
}

/// Cooperative cancellation token.
///
/// A flag built with [`InterruptFlag::from_signals`] also observes the signal handlers;
/// one built with [`InterruptFlag::new`] only fires via [`InterruptFlag::trigger`].
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    local: Arc<AtomicBool>,
    watch_signals: bool,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_signals() -> Self {
        Self {
            local: Arc::new(AtomicBool::new(false)),
            watch_signals: true,
        }
    }

    pub fn trigger(&self) {
        self.local.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.local.load(Ordering::SeqCst)
            || (self.watch_signals && SIGNALLED.load(Ordering::SeqCst))
    }

    /// `Err(Interrupted)` once the flag has fired.
    pub fn check(&self) -> PatchResult<()> {
        if self.is_set() {
            Err(PatchError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// A step that failed while the flag was up most likely lost its child to the same
    /// signal; report that as `Interrupted` rather than as a tool failure.
    pub fn attribute(&self, err: PatchError) -> PatchError {
        if self.is_set() {
            PatchError::Interrupted
        } else {
            err
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_shared_between_clones() {
        let flag = InterruptFlag::new();
        let clone = flag.clone();
        assert!(flag.check().is_ok());
        clone.trigger();
        assert!(flag.is_set());
        assert!(matches!(flag.check(), Err(PatchError::Interrupted)));
    }

    #[test]
    fn failures_while_set_become_interrupted() {
        let flag = InterruptFlag::new();
        let err = flag.attribute(PatchError::from(anyhow::anyhow!("git commit died")));
        assert!(matches!(err, PatchError::Execution(_)));
        flag.trigger();
        let err = flag.attribute(PatchError::from(anyhow::anyhow!("git commit died")));
        assert_eq!(err.exit_code(), 130);
    }

    #[test]
    fn local_flags_ignore_process_signal_state() {
        let flag = InterruptFlag::new();
        assert!(!flag.watch_signals);
        assert!(!flag.is_set());
    }
}
