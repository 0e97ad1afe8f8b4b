//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use spewer_trace::{ConfigError, TraceOutput, TracerConfig};

/// Exit code for success.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when the script raised or could not be loaded.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for a bad tracer configuration.
pub const EXIT_USAGE: u8 = 2;

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(name = "spewer")]
#[command(about = "Run spewer scripts and print every step they take")]
#[command(version)]
pub struct Cli {
    /// Log internal diagnostics (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a script under the tracer
    Run(RunArgs),
}

/// Arguments of `spewer run`.
///
/// Each tracer setting has a flag and its negation; the last one given wins.
/// Settings not named on the command line come from the `SPEWER_*`
/// environment.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Script files; the first one is executed, the rest are importable
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Call this function of the first file instead of running its top level
    #[arg(long, value_name = "FN")]
    pub call: Option<String>,

    /// Only trace these modules (repeatable)
    #[arg(long = "module", value_name = "NAME")]
    pub modules: Vec<String>,

    /// Trace every module, ignoring SPEWER_MODULES
    #[arg(long, conflicts_with = "modules")]
    pub all_modules: bool,

    /// Trace function calls instead of lines
    #[arg(long, overrides_with = "lines")]
    pub functions_only: bool,

    /// Trace lines (the default)
    #[arg(long, overrides_with = "functions_only")]
    pub lines: bool,

    /// Leave values out of records
    #[arg(long, overrides_with = "show_values")]
    pub hide_values: bool,

    /// Include values in records (the default)
    #[arg(long, overrides_with = "hide_values")]
    pub show_values: bool,

    /// Do not report returns
    #[arg(long, overrides_with = "returns")]
    pub no_returns: bool,

    /// Report returns (the default)
    #[arg(long, overrides_with = "no_returns")]
    pub returns: bool,

    /// Do not report exceptions
    #[arg(long, overrides_with = "exceptions")]
    pub no_exceptions: bool,

    /// Report exceptions (the default)
    #[arg(long, overrides_with = "no_exceptions")]
    pub exceptions: bool,

    /// Report builtin calls (with --functions-only)
    #[arg(long, overrides_with = "no_natives")]
    pub natives: bool,

    /// Do not report builtin calls (the default)
    #[arg(long, overrides_with = "natives")]
    pub no_natives: bool,

    /// Where trace records go
    #[arg(long, value_enum, default_value = "stderr")]
    pub output: OutputArg,

    /// Maximum call depth before RecursionError
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

impl RunArgs {
    /// Applies the command-line flags on top of `base`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an invalid `--module` name.
    pub fn tracer_config(&self, base: &TracerConfig) -> Result<TracerConfig, ConfigError> {
        let mut builder = base.to_builder();
        if self.all_modules {
            builder = builder.with_modules(std::iter::empty::<String>());
        } else if !self.modules.is_empty() {
            builder = builder.with_modules(self.modules.iter().cloned());
        }
        if let Some(on) = switch(self.functions_only, self.lines) {
            builder = builder.with_functions_only(on);
        }
        if let Some(on) = switch(self.show_values, self.hide_values) {
            builder = builder.with_show_values(on);
        }
        if let Some(on) = switch(self.returns, self.no_returns) {
            builder = builder.with_trace_returns(on);
        }
        if let Some(on) = switch(self.exceptions, self.no_exceptions) {
            builder = builder.with_trace_exceptions(on);
        }
        if let Some(on) = switch(self.natives, self.no_natives) {
            builder = builder.with_trace_natives(on);
        }
        builder.build()
    }
}

/// The setting a flag pair asks for, if either flag was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Trace destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Standard error
    #[default]
    Stderr,
    /// Standard output
    Stdout,
}

impl From<OutputArg> for TraceOutput {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Stderr => Self::Stderr,
            OutputArg::Stdout => Self::Stdout,
        }
    }
}
