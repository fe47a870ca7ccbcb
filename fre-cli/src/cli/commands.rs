//! Command implementations and argument parsing for the fre CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fre_catalog::{
    CatalogError, CatalogField, CatalogFilter, CatalogOutput, CatalogRequest, WriteMode,
    build_catalog, parse_filter_pair,
};
use fre_pp::{
    DEFAULT_PROGRAM, Experiment, FreCommandStages, PpError, PpReport, PpRequest, run_all_pp_steps,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "fre", about = "FRE data catalog and post-processing tools.")]
pub struct Cli {
    /// Command group to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported command groups.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Data catalog commands.
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Post-processing workflow commands.
    #[command(subcommand)]
    Pp(PpCommand),
}

/// `fre catalog` subcommands.
#[derive(Debug, Subcommand, Clone)]
pub enum CatalogCommand {
    /// Crawl a pp directory and write a CSV catalog with its JSON descriptor.
    Build(BuildArgs),
}

/// `fre pp` subcommands.
#[derive(Debug, Subcommand, Clone)]
pub enum PpCommand {
    /// Run checkout, configure, install, run, trigger, and status in order.
    All(AllArgs),
}

/// Options accepted by `fre catalog build`.
#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    /// Root of the post-processed output tree.
    pub input_path: PathBuf,

    /// Output stem; `.csv` and `.json` are appended.
    pub output_path: PathBuf,

    /// Only catalog this modeling realm.
    #[arg(long)]
    pub filter_realm: Option<String>,

    /// Only catalog this frequency.
    #[arg(long)]
    pub filter_freq: Option<String>,

    /// Only catalog this chunk size.
    #[arg(long)]
    pub filter_chunk: Option<String>,

    /// Drop entries whose FIELD equals VALUE (repeatable).
    #[arg(long = "ignore", value_name = "FIELD=VALUE", value_parser = parse_filter_pair)]
    pub ignore: Vec<(CatalogField, String)>,

    /// JSON descriptor template (defaults to the builtin GFDL template).
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Replace an existing catalog.
    #[arg(long, conflicts_with = "append")]
    pub overwrite: bool,

    /// Append rows to an existing catalog.
    #[arg(long)]
    pub append: bool,
}

/// Options accepted by `fre pp all`.
#[derive(Debug, Args, Clone)]
pub struct AllArgs {
    /// Experiment name.
    #[arg(short = 'e', long)]
    pub experiment: String,

    /// Platform name.
    #[arg(short = 'p', long)]
    pub platform: String,

    /// Target name.
    #[arg(short = 'T', long)]
    pub target: String,

    /// Path to the experiment YAML.
    #[arg(short = 'c', long = "config-file")]
    pub config_file: PathBuf,

    /// Workflow template branch to check out.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// History time to trigger; the trigger stage is skipped without it.
    #[arg(short = 't', long)]
    pub time: Option<String>,

    /// Program providing the `pp` subcommands.
    #[arg(long = "fre-program", env = "FRE_PP_PROGRAM", default_value = DEFAULT_PROGRAM)]
    pub fre_program: PathBuf,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Catalog construction failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The pp stage sequence failed.
    #[error(transparent)]
    Pp(#[from] PpError),
}

impl CliError {
    /// Stable machine-readable code of the underlying failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Catalog(err) => err.code().as_str(),
            Self::Pp(err) => err.code().as_str(),
        }
    }

    /// Code of the failing stage, when a pp stage failed.
    #[must_use]
    pub const fn stage_code(&self) -> Option<&'static str> {
        match self {
            Self::Pp(err) => match err.stage_code() {
                Some(code) => Some(code.as_str()),
                None => None,
            },
            Self::Catalog(_) => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionSummary {
    /// Files written by `fre catalog build`.
    Catalog(CatalogOutput),
    /// Stages executed by `fre pp all`.
    Pp(PpReport),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the command fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use fre_cli::cli::{BuildArgs, CatalogCommand, Cli, Command, ExecutionSummary, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = tempfile::tempdir()?;
/// std::fs::create_dir_all(dir.path().join("pp"))?;
/// let cli = Cli {
///     command: Command::Catalog(CatalogCommand::Build(BuildArgs {
///         input_path: dir.path().join("pp"),
///         output_path: dir.path().join("empty"),
///         filter_realm: None,
///         filter_freq: None,
///         filter_chunk: None,
///         ignore: Vec::new(),
///         template: None,
///         overwrite: false,
///         append: false,
///     })),
/// };
/// match run_cli(cli)? {
///     ExecutionSummary::Catalog(output) => assert_eq!(output.entries, 0),
///     other => panic!("unexpected summary: {other:?}"),
/// }
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Catalog(CatalogCommand::Build(args)) => {
            span.record("command", field::display("catalog build"));
            run_build(args).map(ExecutionSummary::Catalog)
        }
        Command::Pp(PpCommand::All(args)) => {
            span.record("command", field::display("pp all"));
            run_all(args).map(ExecutionSummary::Pp)
        }
    }
}

#[instrument(
    name = "cli.catalog_build",
    err,
    skip(args),
    fields(input_path = %args.input_path.display(), mode = field::Empty),
)]
pub(super) fn run_build(args: BuildArgs) -> Result<CatalogOutput, CliError> {
    let request = catalog_request(args);
    Span::current().record("mode", field::debug(request.mode));
    let output = build_catalog(&request)?;
    info!(
        entries = output.entries,
        csv_path = %output.csv_path.display(),
        "catalog command completed"
    );
    Ok(output)
}

pub(super) fn catalog_request(args: BuildArgs) -> CatalogRequest {
    let BuildArgs {
        input_path,
        output_path,
        filter_realm,
        filter_freq,
        filter_chunk,
        ignore,
        template,
        overwrite,
        append,
    } = args;
    let filter = ignore
        .into_iter()
        .fold(CatalogFilter::default_ignores(), |filter, (field, value)| {
            filter.ignore(field, value)
        })
        .with_search(
            filter_realm.as_deref(),
            filter_freq.as_deref(),
            filter_chunk.as_deref(),
        );
    CatalogRequest {
        filter,
        template,
        mode: WriteMode::from_flags(overwrite, append),
        ..CatalogRequest::new(input_path, output_path)
    }
}

#[instrument(
    name = "cli.pp_all",
    err,
    skip(args),
    fields(program = %args.fre_program.display()),
)]
pub(super) fn run_all(args: AllArgs) -> Result<PpReport, CliError> {
    let stages = FreCommandStages::new(args.fre_program.clone());
    let request = pp_request(args);
    let report = run_all_pp_steps(&stages, &request)?;
    info!(stages = report.stages.len(), "pp command completed");
    Ok(report)
}

pub(super) fn pp_request(args: AllArgs) -> PpRequest {
    let AllArgs {
        experiment,
        platform,
        target,
        config_file,
        branch,
        time,
        fre_program: _,
    } = args;
    PpRequest {
        experiment: Experiment::new(experiment, platform, target),
        config_file,
        branch,
        time,
    }
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use fre_cli::cli::{ExecutionSummary, render_summary};
/// # use fre_catalog::CatalogOutput;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Catalog(CatalogOutput {
///     csv_path: "/out/cat.csv".into(),
///     json_path: "/out/cat.json".into(),
///     entries: 2,
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "JSON generated at: /out/cat.json\nCSV generated at: /out/cat.csv\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Catalog(output) => {
            writeln!(writer, "JSON generated at: {}", output.json_path.display())?;
            writeln!(writer, "CSV generated at: {}", output.csv_path.display())?;
        }
        ExecutionSummary::Pp(report) => {
            writeln!(writer, "config file: {}", report.config_file.display())?;
            let stages: Vec<&str> = report.stages.iter().map(|stage| stage.as_str()).collect();
            writeln!(writer, "stages: {}", stages.join(", "))?;
        }
    }
    Ok(())
}
