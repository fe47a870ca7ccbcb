//! Post-processing stages and the seam through which they are invoked.

use std::{fmt, path::Path};

use crate::error::StageError;

/// The experiment/platform/target triple every stage operates on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Experiment {
    /// Experiment name as it appears in the model YAML.
    pub name: String,
    /// FRE platform, e.g. `gfdl.ncrc5-intel23`.
    pub platform: String,
    /// Compilation target, e.g. `prod-openmp`.
    pub target: String,
}

impl Experiment {
    /// Creates an experiment triple.
    ///
    /// # Examples
    /// ```
    /// use fre_pp::Experiment;
    ///
    /// let exp = Experiment::new("c96L65_am5f7b12r1_amip", "gfdl.ncrc5-intel23", "prod-openmp");
    /// assert_eq!(exp.to_string(), "c96L65_am5f7b12r1_amip/gfdl.ncrc5-intel23/prod-openmp");
    /// ```
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        platform: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.name, self.platform, self.target)
    }
}

/// A pipeline stage, in execution order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stage {
    /// Clone the pp workflow template.
    Checkout,
    /// Render the workflow configuration from the experiment YAML.
    Configure,
    /// Install the configured workflow.
    Install,
    /// Start the workflow.
    Run,
    /// Trigger processing of a single history time.
    Trigger,
    /// Report workflow status.
    Status,
}

impl Stage {
    /// Stable label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Configure => "configure",
            Self::Install => "install",
            Self::Run => "run",
            Self::Trigger => "trigger",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry points of the pp subtools.
///
/// Implementations perform one stage per call and report failure through
/// [`StageError`]; sequencing is the orchestrator's job.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use fre_pp::{Experiment, PpStages, StageError};
///
/// struct DryRun;
///
/// impl PpStages for DryRun {
///     fn checkout(&self, _: &Experiment, _: Option<&str>) -> Result<(), StageError> { Ok(()) }
///     fn configure(&self, _: &Path, _: &Experiment) -> Result<(), StageError> { Ok(()) }
///     fn install(&self, _: &Experiment) -> Result<(), StageError> { Ok(()) }
///     fn run(&self, _: &Experiment) -> Result<(), StageError> { Ok(()) }
///     fn trigger(&self, _: &Experiment, _: &str) -> Result<(), StageError> { Ok(()) }
///     fn status(&self, _: &Experiment) -> Result<(), StageError> { Ok(()) }
/// }
///
/// let exp = Experiment::new("exp", "platform", "target");
/// assert!(DryRun.install(&exp).is_ok());
/// ```
pub trait PpStages {
    /// Checks out the workflow template, optionally at `branch`.
    fn checkout(&self, experiment: &Experiment, branch: Option<&str>) -> Result<(), StageError>;

    /// Configures the workflow from `config_file`.
    fn configure(&self, config_file: &Path, experiment: &Experiment) -> Result<(), StageError>;

    /// Installs the workflow.
    fn install(&self, experiment: &Experiment) -> Result<(), StageError>;

    /// Runs the workflow.
    fn run(&self, experiment: &Experiment) -> Result<(), StageError>;

    /// Triggers processing of history `time`.
    fn trigger(&self, experiment: &Experiment, time: &str) -> Result<(), StageError>;

    /// Reports workflow status.
    fn status(&self, experiment: &Experiment) -> Result<(), StageError>;
}

impl<T: PpStages + ?Sized> PpStages for &T {
    fn checkout(&self, experiment: &Experiment, branch: Option<&str>) -> Result<(), StageError> {
        (**self).checkout(experiment, branch)
    }

    fn configure(&self, config_file: &Path, experiment: &Experiment) -> Result<(), StageError> {
        (**self).configure(config_file, experiment)
    }

    fn install(&self, experiment: &Experiment) -> Result<(), StageError> {
        (**self).install(experiment)
    }

    fn run(&self, experiment: &Experiment) -> Result<(), StageError> {
        (**self).run(experiment)
    }

    fn trigger(&self, experiment: &Experiment, time: &str) -> Result<(), StageError> {
        (**self).trigger(experiment, time)
    }

    fn status(&self, experiment: &Experiment) -> Result<(), StageError> {
        (**self).status(experiment)
    }
}
