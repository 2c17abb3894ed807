//! Diagnostic logging setup.
//!
//! `SAFE_PATCH_LOG` takes an `EnvFilter` directive (e.g. `debug`, `safe_patch=trace`).
//! Without it the filter is `warn`, or `debug` when the caller asks for verbose output.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SAFE_PATCH_LOG";

static INIT: OnceCell<()> = OnceCell::new();

pub(crate) fn filter_directive(env_value: Option<&str>, verbose: bool) -> String {
    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => v.to_string(),
        None if verbose => "debug".to_string(),
        None => "warn".to_string(),
    }
}

/// Install the stderr fmt subscriber once; later calls are no-ops.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        let directive = filter_directive(env::var(LOG_ENV).ok().as_deref(), verbose);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        if tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_err()
        {
            eprintln!("safe-patch: logging init skipped (global subscriber already set)");
        }
    });
}
