//! Local filesystem crawler for FRE post-processed output.
//!
//! FRE writes post-processed data under
//! `<source_id>/<activity_id>/<experiment_id>/<platform>/pp/<realm>/<kind>/<frequency>/<chunk>/`
//! with filenames of the form `<realm>.<temporal_subset>.<variable>.nc`. The
//! crawler recovers catalog columns from both and applies a
//! [`CatalogFilter`].

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use tracing::{Span, debug, field, info, instrument, warn};

use crate::{
    entry::{CatalogEntry, CatalogField},
    error::{CatalogError, Result},
    filter::CatalogFilter,
    paths::resolve,
};

const NETCDF_SUFFIX: &str = ".nc";
const PP_COMPONENT: &str = "pp";

/// Columns encoded by the directories preceding `pp/`, nearest first.
const PROJECT_FIELDS: [CatalogField; 4] = [
    CatalogField::Platform,
    CatalogField::ExperimentId,
    CatalogField::ActivityId,
    CatalogField::SourceId,
];

/// Columns encoded by the directories following `pp/`.
const DRS_FIELDS: [CatalogField; 4] = [
    CatalogField::ModelingRealm,
    CatalogField::CellMethods,
    CatalogField::Frequency,
    CatalogField::ChunkFreq,
];

/// Crawls `project_dir` for NetCDF files and returns the entries accepted by
/// `filter`, sorted by path.
///
/// `project_dir` is made absolute with `.` and `..` folded away, so the
/// `path` column never carries them. Symlinked directories are not followed.
/// Subdirectories that cannot be listed are logged and skipped.
///
/// # Errors
/// Returns [`CatalogError::Crawl`] when `project_dir` itself cannot be read
/// and [`CatalogError::Io`] when it cannot be made absolute.
///
/// # Examples
/// ```
/// # use std::fs;
/// # use fre_catalog::{CatalogField, CatalogFilter, crawl_local};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = tempfile::tempdir()?;
/// let chunk = root.path().join("pp/atmos/ts/monthly/5yr");
/// fs::create_dir_all(&chunk)?;
/// fs::write(chunk.join("atmos.000101-000512.tas.nc"), b"")?;
///
/// let entries = crawl_local(&root.path().join("pp"), &CatalogFilter::new())?;
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].get(CatalogField::VariableId), Some("tas"));
/// assert_eq!(entries[0].get(CatalogField::ChunkFreq), Some("5yr"));
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "catalog.crawl",
    err,
    skip(project_dir, filter),
    fields(project_dir = field::Empty, files = field::Empty, entries = field::Empty),
)]
pub fn crawl_local(project_dir: &Path, filter: &CatalogFilter) -> Result<Vec<CatalogEntry>> {
    let root = resolve(project_dir).map_err(|source| CatalogError::Io {
        path: project_dir.to_path_buf(),
        source,
    })?;
    let span = Span::current();
    span.record("project_dir", field::display(root.display()));

    let mut files = list_netcdf_files(&root)?;
    files.sort();
    span.record("files", files.len());

    let entries: Vec<CatalogEntry> = files
        .iter()
        .map(|path| describe_file(&root, path))
        .filter(|entry| filter.matches(entry))
        .collect();
    span.record("entries", entries.len());
    info!(
        files = files.len(),
        entries = entries.len(),
        "crawl completed"
    );
    Ok(entries)
}

fn list_netcdf_files(root: &Path) -> Result<Vec<PathBuf>> {
    let top = fs::read_dir(root).map_err(|source| CatalogError::Crawl {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    let mut pending = vec![top];
    while let Some(listing) = pending.pop() {
        for dir_entry in listing {
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = dir_entry.path();
            let Ok(file_type) = dir_entry.file_type() else {
                warn!(path = %path.display(), "skipping entry with unknown file type");
                continue;
            };
            if file_type.is_dir() {
                match fs::read_dir(&path) {
                    Ok(listing) => pending.push(listing),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "skipping unreadable directory");
                    }
                }
            } else if is_catalogued_file(&path) && path.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}

fn is_catalogued_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if name.contains("static") {
        debug!(path = %path.display(), "skipping static file");
        return false;
    }
    name.ends_with(NETCDF_SUFFIX)
}

/// Builds the catalog entry for a single file under `root`.
pub(crate) fn describe_file(root: &Path, path: &Path) -> CatalogEntry {
    let mut entry = CatalogEntry::new();
    entry.set(CatalogField::Path, path.to_string_lossy());

    let directory = path.parent().unwrap_or(root);
    let components = normal_components(directory);
    match components.iter().rposition(|part| *part == PP_COMPONENT) {
        Some(pp) => {
            let (before, after) = components.split_at(pp);
            assign(&mut entry, before.iter().rev().copied(), PROJECT_FIELDS);
            assign(&mut entry, after.iter().skip(1).copied(), DRS_FIELDS);
        }
        None => {
            let relative = directory.strip_prefix(root).unwrap_or(directory);
            assign(&mut entry, normal_components(relative).into_iter(), DRS_FIELDS);
        }
    }

    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        describe_filename(&mut entry, name);
    }
    entry
}

fn describe_filename(entry: &mut CatalogEntry, name: &str) {
    let stem = name.strip_suffix(NETCDF_SUFFIX).unwrap_or(name);
    let parts: Vec<&str> = stem.split('.').collect();
    match parts.as_slice() {
        [realm, subset, variable] => {
            entry.set_if_absent(CatalogField::ModelingRealm, *realm);
            entry.set(CatalogField::TemporalSubset, *subset);
            entry.set(CatalogField::VariableId, *variable);
        }
        [.., variable] => entry.set(CatalogField::VariableId, *variable),
        [] => {}
    }
}

fn assign<'a>(
    entry: &mut CatalogEntry,
    values: impl Iterator<Item = &'a str>,
    fields: [CatalogField; 4],
) {
    for (value, field) in values.zip(fields) {
        entry.set(field, value);
    }
}

fn normal_components(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect()
}
