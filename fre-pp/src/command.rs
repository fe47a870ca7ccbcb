//! Stages backed by the `fre pp` subcommands.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, instrument};

use crate::{
    error::StageError,
    stages::{Experiment, PpStages, Stage},
};

/// Program used when none is configured.
pub const DEFAULT_PROGRAM: &str = "fre";

/// Runs each stage as `<program> pp <subcommand> ...`, inheriting stdio and
/// waiting for the child to exit.
///
/// # Examples
/// ```
/// use fre_pp::{Experiment, FreCommandStages, Stage};
///
/// let stages = FreCommandStages::default();
/// let exp = Experiment::new("am5", "ncrc5.intel23", "prod");
/// let command = stages.command(Stage::Install, &exp, &[]);
/// let args: Vec<_> = command.get_args().collect();
/// assert_eq!(command.get_program(), "fre");
/// assert_eq!(args, ["pp", "install", "-e", "am5", "-p", "ncrc5.intel23", "-T", "prod"]);
/// ```
#[derive(Clone, Debug)]
pub struct FreCommandStages {
    program: PathBuf,
}

impl Default for FreCommandStages {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl FreCommandStages {
    /// Uses `program` in place of `fre`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Builds the command for `stage` with stage-specific `extra` arguments
    /// appended after the experiment triple.
    #[must_use]
    pub fn command(&self, stage: Stage, experiment: &Experiment, extra: &[OsString]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("pp")
            .arg(subcommand(stage))
            .args(["-e", experiment.name.as_str()])
            .args(["-p", experiment.platform.as_str()])
            .args(["-T", experiment.target.as_str()])
            .args(extra);
        command
    }

    #[instrument(
        name = "pp.subtool",
        err,
        skip(self, experiment, extra),
        fields(stage = stage.as_str(), program = %self.program.display()),
    )]
    fn execute(
        &self,
        stage: Stage,
        experiment: &Experiment,
        extra: &[OsString],
    ) -> Result<(), StageError> {
        let mut command = self.command(stage, experiment, extra);
        debug!(command = ?command, "spawning subtool");
        let status = command.status().map_err(|source| StageError::Spawn {
            stage,
            program: self.program.clone(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(StageError::Failed { stage, status })
        }
    }
}

const fn subcommand(stage: Stage) -> &'static str {
    match stage {
        Stage::Checkout => "checkout",
        Stage::Configure => "configure-yaml",
        Stage::Install => "install",
        Stage::Run => "run",
        Stage::Trigger => "trigger",
        Stage::Status => "status",
    }
}

impl PpStages for FreCommandStages {
    fn checkout(&self, experiment: &Experiment, branch: Option<&str>) -> Result<(), StageError> {
        let extra: Vec<OsString> = branch
            .map(|branch| vec!["-b".into(), branch.into()])
            .unwrap_or_default();
        self.execute(Stage::Checkout, experiment, &extra)
    }

    fn configure(&self, config_file: &Path, experiment: &Experiment) -> Result<(), StageError> {
        let extra = [OsString::from("-y"), config_file.as_os_str().to_owned()];
        self.execute(Stage::Configure, experiment, &extra)
    }

    fn install(&self, experiment: &Experiment) -> Result<(), StageError> {
        self.execute(Stage::Install, experiment, &[])
    }

    fn run(&self, experiment: &Experiment) -> Result<(), StageError> {
        self.execute(Stage::Run, experiment, &[])
    }

    fn trigger(&self, experiment: &Experiment, time: &str) -> Result<(), StageError> {
        self.execute(Stage::Trigger, experiment, &["-t".into(), time.into()])
    }

    fn status(&self, experiment: &Experiment) -> Result<(), StageError> {
        self.execute(Stage::Status, experiment, &[])
    }
}
