//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests build temporary pp trees and assert error handling
//! behaviour. These helpers keep the test cases concise and consistent.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{BuildArgs, Cli, CliError, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

/// Creates `<dir>/pp` holding two monthly atmosphere files and one daily
/// ocean file, and returns the `pp` directory.
pub(super) fn create_pp_tree(dir: &TempDir) -> PathBuf {
    let pp = dir.path().join("pp");
    for relative in [
        "atmos/ts/monthly/5yr/atmos.000101-000512.tas.nc",
        "atmos/ts/monthly/5yr/atmos.000101-000512.pr.nc",
        "ocean/ts/daily/1yr/ocean.00010101-00011231.sst.nc",
    ] {
        touch(&pp.join(relative));
    }
    pp
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            panic!("failed to create {}: {err}", parent.display());
        }
    }
    if let Err(err) = fs::write(path, b"") {
        panic!("failed to create {}: {err}", path.display());
    }
}

pub(super) fn build_args(input_path: PathBuf, output_path: PathBuf) -> BuildArgs {
    BuildArgs {
        input_path,
        output_path,
        filter_realm: None,
        filter_freq: None,
        filter_chunk: None,
        ignore: Vec::new(),
        template: None,
        overwrite: false,
        append: false,
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
