//! Command-line interface orchestration for the fre tools.
//!
//! `fre catalog build` crawls post-processed output into a CSV catalog with a
//! JSON descriptor; `fre pp all` drives every pp stage for one experiment.

mod commands;

pub use commands::{
    AllArgs, BuildArgs, CatalogCommand, Cli, CliError, Command, ExecutionSummary, PpCommand,
    render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
