//! The `run` command.

use std::process::ExitCode;
use std::sync::Arc;

use spewer_foundation::{ObserverSlot, Value};
use spewer_language::Vm;
use spewer_trace::{ConfigError, SpewGuard, TraceHook, TraceOutput, TracerConfig, ValueFormatter};
use thiserror::Error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE, RunArgs};

/// Failures before the script starts.
#[derive(Debug, Error)]
pub enum RunError {
    /// The tracer configuration is invalid.
    #[error("invalid tracer configuration: {0}")]
    Config(#[from] ConfigError),

    /// A script file could not be read or parsed.
    #[error(transparent)]
    Load(#[from] spewer_foundation::Error),
}

/// What a traced run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Lines printed by the script.
    pub output: Vec<String>,
    /// The value returned, or the exception that escaped.
    pub result: spewer_foundation::Result<Value>,
}

/// Loads `args.files`, then runs the first one with a tracer installed in
/// `slot`. The tracer is removed before returning, whatever the outcome.
///
/// # Errors
///
/// Returns [`RunError::Load`] if a file cannot be loaded. Script exceptions
/// are not errors here; they are in [`RunReport::result`].
pub fn run_script(
    args: &RunArgs,
    config: TracerConfig,
    output: TraceOutput,
    slot: Arc<ObserverSlot>,
) -> Result<RunReport, RunError> {
    let mut vm = Vm::with_slot(Arc::clone(&slot));
    if let Some(depth) = args.max_depth {
        vm.set_max_depth(depth);
    }

    let mut entry = None;
    for path in &args.files {
        let name = vm.load_file(path)?;
        tracing::debug!(module = %name, path = %path.display(), "module loaded");
        entry.get_or_insert(name);
    }
    let Some(entry) = entry else {
        return Ok(RunReport {
            output: Vec::new(),
            result: Ok(Value::Nil),
        });
    };

    let hook = Arc::new(TraceHook::with_output(config, output));
    let result = {
        let _guard = SpewGuard::new(slot, hook);
        match &args.call {
            Some(function) => vm.call(&entry, function, &[]),
            None => vm.run_module(&entry),
        }
    };

    Ok(RunReport {
        output: vm.take_output(),
        result,
    })
}

/// Runs `spewer run` against the global slot and reports the outcome on the
/// standard streams.
#[must_use]
pub fn run_command(args: &RunArgs) -> ExitCode {
    let config = match TracerConfig::from_env().and_then(|base| args.tracer_config(&base)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", RunError::from(err));
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let report = match run_script(args, config, args.output.into(), ObserverSlot::global()) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    for line in &report.output {
        println!("{line}");
    }
    match report.result {
        Ok(value) => {
            if args.call.is_some() {
                println!("{}", ValueFormatter::new().repr_or_placeholder(&value));
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
