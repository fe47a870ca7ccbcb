//! Error types for the pp orchestrator.

use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

use crate::stages::Stage;

/// Failure reported by a single stage.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage's program could not be started.
    #[error("failed to start `{program}` for {stage}: {source}")]
    Spawn {
        /// Stage being executed.
        stage: Stage,
        /// Program that could not be spawned.
        program: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The stage's program exited unsuccessfully.
    #[error("{stage} exited with {status}")]
    Failed {
        /// Stage being executed.
        stage: Stage,
        /// Exit status reported by the operating system.
        status: ExitStatus,
    },
    /// A stage implementation refused the request without spawning anything.
    #[error("{stage} rejected: {reason}")]
    Rejected {
        /// Stage being executed.
        stage: Stage,
        /// Human-readable explanation.
        reason: String,
    },
}

/// Stable codes describing [`StageError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum StageErrorCode {
    /// The stage's program could not be started.
    Spawn,
    /// The stage's program exited unsuccessfully.
    Failed,
    /// The stage implementation refused the request.
    Rejected,
}

impl StageErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spawn => "PP_STAGE_SPAWN_FAILED",
            Self::Failed => "PP_STAGE_EXIT_FAILURE",
            Self::Rejected => "PP_STAGE_REJECTED",
        }
    }
}

impl StageError {
    /// Retrieve the stable [`StageErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> StageErrorCode {
        match self {
            Self::Spawn { .. } => StageErrorCode::Spawn,
            Self::Failed { .. } => StageErrorCode::Failed,
            Self::Rejected { .. } => StageErrorCode::Rejected,
        }
    }

    /// The stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Spawn { stage, .. } | Self::Failed { stage, .. } | Self::Rejected { stage, .. } => {
                *stage
            }
        }
    }
}

/// Error produced by [`crate::run_all_pp_steps`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PpError {
    /// The configuration path could not be resolved.
    #[error("failed to resolve config file `{path}`: {source}")]
    ConfigPath {
        /// Path supplied by the caller.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A stage failed; later stages were not run.
    #[error("pp stage {stage} failed")]
    Stage {
        /// Stage that failed.
        stage: Stage,
        /// Failure reported by the stage.
        #[source]
        source: StageError,
    },
}

/// Stable codes describing [`PpError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum PpErrorCode {
    /// The configuration path could not be resolved.
    ConfigPath,
    /// A stage failed.
    StageFailure,
}

impl PpErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "PP_CONFIG_PATH",
            Self::StageFailure => "PP_STAGE_FAILURE",
        }
    }
}

impl PpError {
    /// Retrieve the stable [`PpErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> PpErrorCode {
        match self {
            Self::ConfigPath { .. } => PpErrorCode::ConfigPath,
            Self::Stage { .. } => PpErrorCode::StageFailure,
        }
    }

    /// Retrieve the inner [`StageErrorCode`] when a stage failed.
    #[must_use]
    pub const fn stage_code(&self) -> Option<StageErrorCode> {
        match self {
            Self::Stage { source, .. } => Some(source.code()),
            Self::ConfigPath { .. } => None,
        }
    }
}
