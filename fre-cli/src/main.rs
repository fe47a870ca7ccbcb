//! `fre` binary: catalog builds and pp stage orchestration.
//!
//! Logging is installed before anything else so failures surface as
//! structured `tracing` events on stderr. Stdout only carries the command
//! summary.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use fre_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Run the parsed command and write its summary to stdout.
fn execute(cli: Cli) -> Result<()> {
    let summary = run_cli(cli).context("command failed")?;
    let mut writer = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut writer).context("failed to write summary")?;
    writer.flush().context("failed to flush stdout")
}

fn log_failure(err: &anyhow::Error) {
    let cli_error = err.downcast_ref::<CliError>();
    let message = format!("{err:#}");
    error!(
        error = %message,
        code = cli_error.map(|cli_error| field::display(cli_error.code())),
        stage_code = cli_error
            .and_then(CliError::stage_code)
            .map(field::display),
        "command execution failed"
    );
}

#[expect(
    clippy::print_stderr,
    reason = "logging is unavailable when its own initialisation fails"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
