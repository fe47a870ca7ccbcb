//! Behavioural tests for the pp stage sequence.

use std::cell::RefCell;
use std::path::{Component, Path, PathBuf};

use fre_pp::{
    Experiment, PpError, PpRequest, PpStages, Stage, StageError, StageErrorCode, run_all_pp_steps,
};
use fre_test_support::tracing::capture;
use rstest::{fixture, rstest};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Checkout(Option<String>),
    Configure(PathBuf),
    Install,
    Run,
    Trigger(String),
    Status,
}

/// Records every call and optionally rejects one stage.
#[derive(Default)]
struct RecordingStages {
    calls: RefCell<Vec<(Experiment, Call)>>,
    fail_at: Option<Stage>,
}

impl RecordingStages {
    fn failing_at(stage: Stage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    fn record(&self, stage: Stage, experiment: &Experiment, call: Call) -> Result<(), StageError> {
        self.calls.borrow_mut().push((experiment.clone(), call));
        if self.fail_at == Some(stage) {
            return Err(StageError::Rejected {
                stage,
                reason: "injected failure".to_owned(),
            });
        }
        Ok(())
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().iter().map(|(_, call)| call.clone()).collect()
    }
}

impl PpStages for RecordingStages {
    fn checkout(&self, experiment: &Experiment, branch: Option<&str>) -> Result<(), StageError> {
        self.record(
            Stage::Checkout,
            experiment,
            Call::Checkout(branch.map(str::to_owned)),
        )
    }

    fn configure(&self, config_file: &Path, experiment: &Experiment) -> Result<(), StageError> {
        self.record(
            Stage::Configure,
            experiment,
            Call::Configure(config_file.to_path_buf()),
        )
    }

    fn install(&self, experiment: &Experiment) -> Result<(), StageError> {
        self.record(Stage::Install, experiment, Call::Install)
    }

    fn run(&self, experiment: &Experiment) -> Result<(), StageError> {
        self.record(Stage::Run, experiment, Call::Run)
    }

    fn trigger(&self, experiment: &Experiment, time: &str) -> Result<(), StageError> {
        self.record(Stage::Trigger, experiment, Call::Trigger(time.to_owned()))
    }

    fn status(&self, experiment: &Experiment) -> Result<(), StageError> {
        self.record(Stage::Status, experiment, Call::Status)
    }
}

#[fixture]
fn request() -> PpRequest {
    PpRequest {
        experiment: Experiment::new("c96L65_am5f7b12r1_amip", "gfdl.ncrc5-intel23", "prod-openmp"),
        config_file: PathBuf::from("yamls/am5.yaml"),
        branch: None,
        time: None,
    }
}

fn absolute(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(path) => path,
        Err(err) => panic!("failed to resolve {}: {err}", path.display()),
    }
}

#[rstest]
fn runs_every_stage_except_trigger_without_time(request: PpRequest) -> Result<(), PpError> {
    let stages = RecordingStages::default();
    let report = run_all_pp_steps(&stages, &request)?;

    let config = absolute(&request.config_file);
    assert_eq!(
        stages.calls(),
        [
            Call::Checkout(None),
            Call::Configure(config.clone()),
            Call::Install,
            Call::Run,
            Call::Status,
        ]
    );
    assert_eq!(
        report.stages,
        [Stage::Checkout, Stage::Configure, Stage::Install, Stage::Run, Stage::Status]
    );
    assert_eq!(report.config_file, config);
    Ok(())
}

#[rstest]
fn config_path_is_normalised_before_configure(mut request: PpRequest) -> Result<(), PpError> {
    request.config_file = PathBuf::from("yamls/./drafts/../am5.yaml");
    let stages = RecordingStages::default();
    let report = run_all_pp_steps(&stages, &request)?;

    let expected = absolute(Path::new("yamls/am5.yaml"));
    assert_eq!(report.config_file, expected);
    assert!(
        !report
            .config_file
            .components()
            .any(|part| matches!(part, Component::CurDir | Component::ParentDir))
    );
    assert!(stages.calls().contains(&Call::Configure(expected)));
    Ok(())
}

#[rstest]
fn triggers_before_status_when_time_is_given(mut request: PpRequest) -> Result<(), PpError> {
    request.time = Some("00010101".to_owned());
    request.branch = Some("2025.01".to_owned());
    let stages = RecordingStages::default();
    run_all_pp_steps(&stages, &request)?;

    let calls = stages.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], Call::Checkout(Some("2025.01".to_owned())));
    assert_eq!(calls[4], Call::Trigger("00010101".to_owned()));
    assert_eq!(calls[5], Call::Status);
    Ok(())
}

#[rstest]
fn every_stage_receives_the_same_experiment(request: PpRequest) -> Result<(), PpError> {
    let stages = RecordingStages::default();
    run_all_pp_steps(&stages, &request)?;
    assert!(
        stages
            .calls
            .borrow()
            .iter()
            .all(|(experiment, _)| *experiment == request.experiment)
    );
    Ok(())
}

#[rstest]
#[case::checkout(Stage::Checkout, 1)]
#[case::configure(Stage::Configure, 2)]
#[case::run(Stage::Run, 4)]
#[case::status(Stage::Status, 5)]
fn first_failure_stops_the_sequence(
    request: PpRequest,
    #[case] failing: Stage,
    #[case] attempted: usize,
) {
    let stages = RecordingStages::failing_at(failing);
    let err = match run_all_pp_steps(&stages, &request) {
        Ok(report) => panic!("expected failure, got {report:?}"),
        Err(err) => err,
    };
    assert!(matches!(err, PpError::Stage { stage, .. } if stage == failing));
    assert_eq!(err.stage_code(), Some(StageErrorCode::Rejected));
    assert_eq!(stages.calls().len(), attempted);
}

#[rstest]
fn trigger_failure_skips_status(mut request: PpRequest) {
    request.time = Some("0001".to_owned());
    let stages = RecordingStages::failing_at(Stage::Trigger);
    let result = run_all_pp_steps(&stages, &request);
    assert!(result.is_err());
    assert!(!stages.calls().contains(&Call::Status));
}

#[rstest]
fn progress_is_reported_per_stage(request: PpRequest) {
    let stages = RecordingStages::default();
    let (result, layer) = capture(|| run_all_pp_steps(&stages, &request));
    assert!(result.is_ok());

    let called: Vec<String> = layer
        .events()
        .into_iter()
        .filter(|event| event.fields.get("message").map(String::as_str) == Some("calling stage"))
        .filter_map(|event| event.fields.get("stage").cloned())
        .collect();
    assert_eq!(called, ["checkout", "configure", "install", "run", "status"]);
    assert_eq!(layer.messages().last().map(String::as_str), Some("done"));

    let span = match layer.span("pp.run_all") {
        Some(span) => span,
        None => panic!("pp.run_all span must be recorded"),
    };
    assert_eq!(span.fields.get("time").map(String::as_str), Some("<none>"));
    assert!(span.fields.contains_key("config_file"));
}
