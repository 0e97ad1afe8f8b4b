//! Command-line runner for spewer scripts.
//!
//! This crate provides:
//! - [`Cli`] - Argument parsing for the `spewer` binary
//! - [`run_script`] - Load files and run the first one under a tracer
//! - [`init_logging`] - Diagnostics on standard error, filtered by `RUST_LOG`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod run;

pub use cli::{Cli, Commands, OutputArg, RunArgs};
pub use run::{RunError, RunReport, run_command, run_script};

use tracing_subscriber::EnvFilter;

/// Installs the diagnostic subscriber. `RUST_LOG` wins when set; otherwise
/// only warnings are shown, or everything from debug up with `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
