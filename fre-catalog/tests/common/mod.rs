use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Files laid out the way FRE writes post-processed output, relative to
/// `<root>/ESM4/DECK/ESM4_piControl_D/gfdl.ncrc5-intel23-prod-openmp/pp`.
pub const PP_FILES: [&str; 6] = [
    "atmos_cmip/ts/monthly/5yr/atmos_cmip.000101-000512.tas.nc",
    "atmos_cmip/ts/monthly/5yr/atmos_cmip.000101-000512.pr.nc",
    "atmos_cmip/ts/daily/5yr/atmos_cmip.00010101-00051231.tas.nc",
    "ocean_monthly/ts/monthly/10yr/ocean_monthly.000101-001012.sos.nc",
    "ocean_monthly/ts/monthly/DO_NOT_USE/ocean_monthly.000101-001012.sos.nc",
    "atmos_cmip/atmos_cmip.static.nc",
];

pub const NOISE_FILES: [&str; 2] = ["atmos_cmip/ts/monthly/5yr/README", "history/00010101.tar"];

pub struct PpTree {
    pub dir: TempDir,
    pub pp: PathBuf,
}

pub fn pp_tree() -> PpTree {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    };
    let pp = dir
        .path()
        .join("ESM4/DECK/ESM4_piControl_D/gfdl.ncrc5-intel23-prod-openmp/pp");
    for relative in PP_FILES.iter().chain(NOISE_FILES.iter()) {
        touch(&pp.join(relative));
    }
    PpTree { dir, pp }
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
