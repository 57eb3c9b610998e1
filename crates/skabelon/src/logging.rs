//! Diagnostic output.
//!
//! Logs go to stderr through a `tracing` subscriber so they never mix with
//! anything a dispatch script or the user pipes through stdout. `RUST_LOG`
//! takes precedence over the `--debug`/`--verbose` flags when set.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::config::Verbosity;

/// Builds the log filter for a verbosity, honoring `RUST_LOG` if present.
pub fn filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbosity == Verbosity::Debug)
        .without_time()
        .try_init();
}
