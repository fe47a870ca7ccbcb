//! Sequential execution of every pp stage for one experiment.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use tracing::{Span, field, info, instrument};

use crate::{
    error::{PpError, StageError},
    stages::{Experiment, PpStages, Stage},
};

/// Inputs for [`run_all_pp_steps`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PpRequest {
    /// Experiment triple.
    pub experiment: Experiment,
    /// Experiment YAML; made absolute, with `.` and `..` folded, before use.
    pub config_file: PathBuf,
    /// Workflow template branch passed to checkout.
    pub branch: Option<String>,
    /// History time to trigger; the trigger stage is skipped when `None`.
    pub time: Option<String>,
}

/// Outcome of a completed [`run_all_pp_steps`] call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PpReport {
    /// Absolute configuration path handed to the configure stage.
    pub config_file: PathBuf,
    /// Stages executed, in order.
    pub stages: Vec<Stage>,
}

/// Runs checkout, configure, install, run, trigger (only when
/// `request.time` is set), and status, each exactly once and in that order.
///
/// The first failing stage stops the sequence.
///
/// # Errors
/// Returns [`PpError::ConfigPath`] when the configuration path cannot be made
/// absolute and [`PpError::Stage`] for the first stage that fails.
///
/// # Examples
/// ```
/// use std::{cell::RefCell, path::Path};
/// use fre_pp::{Experiment, PpRequest, PpStages, Stage, StageError, run_all_pp_steps};
///
/// #[derive(Default)]
/// struct Log(RefCell<Vec<&'static str>>);
///
/// impl PpStages for Log {
///     fn checkout(&self, _: &Experiment, _: Option<&str>) -> Result<(), StageError> { self.0.borrow_mut().push("checkout"); Ok(()) }
///     fn configure(&self, _: &Path, _: &Experiment) -> Result<(), StageError> { self.0.borrow_mut().push("configure"); Ok(()) }
///     fn install(&self, _: &Experiment) -> Result<(), StageError> { self.0.borrow_mut().push("install"); Ok(()) }
///     fn run(&self, _: &Experiment) -> Result<(), StageError> { self.0.borrow_mut().push("run"); Ok(()) }
///     fn trigger(&self, _: &Experiment, _: &str) -> Result<(), StageError> { self.0.borrow_mut().push("trigger"); Ok(()) }
///     fn status(&self, _: &Experiment) -> Result<(), StageError> { self.0.borrow_mut().push("status"); Ok(()) }
/// }
///
/// let log = Log::default();
/// let request = PpRequest {
///     experiment: Experiment::new("am5", "ncrc5.intel23", "prod"),
///     config_file: "am5.yaml".into(),
///     branch: None,
///     time: None,
/// };
/// let report = run_all_pp_steps(&log, &request)?;
/// assert_eq!(*log.0.borrow(), ["checkout", "configure", "install", "run", "status"]);
/// assert!(report.config_file.is_absolute());
/// assert!(!report.stages.contains(&Stage::Trigger));
/// # Ok::<(), fre_pp::PpError>(())
/// ```
#[instrument(
    name = "pp.run_all",
    err,
    skip(stages, request),
    fields(
        experiment = %request.experiment,
        config_file = field::Empty,
        branch = request.branch.as_deref().unwrap_or("<default>"),
        time = request.time.as_deref().unwrap_or("<none>"),
    ),
)]
pub fn run_all_pp_steps<S: PpStages>(stages: &S, request: &PpRequest) -> Result<PpReport, PpError> {
    let config_file = resolve(&request.config_file).map_err(|source| PpError::ConfigPath {
        path: request.config_file.clone(),
        source,
    })?;
    Span::current().record("config_file", field::display(config_file.display()));
    info!(config_file = %config_file.display(), "config file path resolved");

    let experiment = &request.experiment;
    let mut executed = Vec::with_capacity(6);
    let mut step = |stage: Stage, call: &dyn Fn() -> Result<(), StageError>| {
        info!(stage = stage.as_str(), "calling stage");
        let outcome = call().map_err(|source| PpError::Stage { stage, source });
        if outcome.is_ok() {
            executed.push(stage);
        }
        outcome
    };

    step(Stage::Checkout, &|| {
        stages.checkout(experiment, request.branch.as_deref())
    })?;
    step(Stage::Configure, &|| stages.configure(&config_file, experiment))?;
    step(Stage::Install, &|| stages.install(experiment))?;
    step(Stage::Run, &|| stages.run(experiment))?;
    if let Some(time) = request.time.as_deref() {
        step(Stage::Trigger, &|| stages.trigger(experiment, time))?;
    }
    step(Stage::Status, &|| stages.status(experiment))?;

    info!(stages = executed.len(), "done");
    Ok(PpReport {
        config_file,
        stages: executed,
    })
}

/// Absolute form of `path` with `.` and `..` folded lexically.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}
