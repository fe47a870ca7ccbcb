//! Orchestration of the FRE post-processing (pp) stages.
//!
//! [`run_all_pp_steps`] drives checkout, configure, install, run, trigger, and
//! status for one experiment through the [`PpStages`] seam.
//! [`FreCommandStages`] implements that seam by invoking the `fre pp`
//! subcommands.

mod command;
mod error;
mod orchestrator;
mod stages;

pub use crate::{
    command::{DEFAULT_PROGRAM, FreCommandStages},
    error::{PpError, PpErrorCode, StageError, StageErrorCode},
    orchestrator::{PpReport, PpRequest, run_all_pp_steps},
    stages::{Experiment, PpStages, Stage},
};
