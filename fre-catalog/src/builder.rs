//! End-to-end catalog construction: crawl, describe, write.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use tracing::{info, instrument};

use crate::{
    crawler::crawl_local,
    error::{CatalogError, Result},
    filter::CatalogFilter,
    paths::resolve,
    template::CatalogTemplate,
    writer::{WriteMode, write_catalog_csv},
};

/// Inputs for [`build_catalog`].
#[derive(Clone, Debug)]
pub struct CatalogRequest {
    /// Directory tree to crawl.
    pub input_path: PathBuf,
    /// Output stem; `.csv` and `.json` are appended to it.
    pub output_path: PathBuf,
    /// Entries to keep.
    pub filter: CatalogFilter,
    /// Descriptor template; the builtin template when `None`.
    pub template: Option<PathBuf>,
    /// Treatment of an existing CSV.
    pub mode: WriteMode,
}

impl CatalogRequest {
    /// Creates a request with the default ignore filter, builtin template,
    /// and [`WriteMode::Create`].
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            filter: CatalogFilter::default_ignores(),
            template: None,
            mode: WriteMode::Create,
        }
    }
}

/// Files produced by [`build_catalog`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogOutput {
    /// Absolute path of the CSV catalog.
    pub csv_path: PathBuf,
    /// Absolute path of the JSON descriptor.
    pub json_path: PathBuf,
    /// Number of catalogued files.
    pub entries: usize,
}

/// Crawls `request.input_path` and writes the CSV catalog and its JSON
/// descriptor next to `request.output_path`.
///
/// Output paths are made absolute with `.` and `..` folded away. The output
/// directory is created when missing. With [`WriteMode::Create`] an existing
/// CSV is refused before anything is written, so the catalog pair is left
/// untouched.
///
/// # Errors
/// Propagates crawler, template, and writer failures as [`CatalogError`].
///
/// # Examples
/// ```
/// # use std::fs;
/// # use fre_catalog::{CatalogRequest, build_catalog};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = tempfile::tempdir()?;
/// let chunk = root.path().join("pp/ocean/ts/monthly/1yr");
/// fs::create_dir_all(&chunk)?;
/// fs::write(chunk.join("ocean.199001-199012.sst.nc"), b"")?;
///
/// let output = build_catalog(&CatalogRequest::new(
///     root.path().join("pp"),
///     root.path().join("catalogs/ocean"),
/// ))?;
/// assert_eq!(output.entries, 1);
/// assert!(output.csv_path.ends_with("catalogs/ocean.csv"));
/// assert!(output.json_path.is_file());
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "catalog.build",
    err,
    skip(request),
    fields(
        input_path = %request.input_path.display(),
        output_path = %request.output_path.display(),
    ),
)]
pub fn build_catalog(request: &CatalogRequest) -> Result<CatalogOutput> {
    let csv_path = absolute(&with_suffix(&request.output_path, ".csv"))?;
    let json_path = absolute(&with_suffix(&request.output_path, ".json"))?;
    if request.mode == WriteMode::Create && exists(&csv_path)? {
        return Err(CatalogError::AlreadyExists { path: csv_path });
    }
    ensure_parent_dir(&csv_path)?;

    let template = match &request.template {
        Some(path) => CatalogTemplate::load(path)?,
        None => CatalogTemplate::builtin()?,
    };

    info!(project_dir = %request.input_path.display(), "crawling project directory");
    let entries = crawl_local(&request.input_path, &request.filter)?;

    template.write(&csv_path, &json_path)?;
    info!(path = %json_path.display(), "JSON generated");
    write_catalog_csv(&entries, &csv_path, request.mode)?;
    info!(path = %csv_path.display(), entries = entries.len(), "CSV generated");

    Ok(CatalogOutput {
        csv_path,
        json_path,
        entries: entries.len(),
    })
}

/// Appends `suffix` to the final component of `stem` without replacing an
/// existing extension.
fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut raw = OsString::from(stem.as_os_str());
    raw.push(suffix);
    PathBuf::from(raw)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    resolve(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.is_dir() => {
            fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
