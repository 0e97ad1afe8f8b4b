//! spewer CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use spewer_runtime::{Cli, Commands, init_logging, run_command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Run(args) => run_command(args),
    }
}
